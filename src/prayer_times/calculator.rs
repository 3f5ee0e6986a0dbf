use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use salah::prelude::*;

use crate::config::LocationConfig;
use crate::models::PrayerTimes;

/// Offline prayer-time calculation for a fixed location.
#[derive(Debug, Clone)]
pub struct PrayerCalculator {
    pub lat: f64,
    pub lng: f64,
    pub method_str: String,
    pub madhab_str: String,
    pub tz_offset_minutes: i32,
}

impl PrayerCalculator {
    pub fn new(
        lat: f64,
        lng: f64,
        method: &str,
        madhab: &str,
        tz_offset_minutes: i32,
    ) -> Result<Self> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        FixedOffset::east_opt(tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", tz_offset_minutes))?;
        Ok(Self {
            lat,
            lng,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
            tz_offset_minutes,
        })
    }

    pub fn from_config(location: &LocationConfig) -> Result<Self> {
        Self::new(
            location.latitude,
            location.longitude,
            &location.calc_method,
            &location.madhab,
            location.timezone_offset,
        )
    }

    /// Local `HH:MM` times for the five prayers on `date`.
    pub fn compute_times(&self, date: NaiveDate) -> Result<PrayerTimes> {
        let coords = Coordinates::new(self.lat, self.lng);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| anyhow!("Prayer calculation failed: {}", e))?;

        let offset = FixedOffset::east_opt(self.tz_offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {}", self.tz_offset_minutes))?;

        let local = |utc: DateTime<Utc>| -> String {
            utc.with_timezone(&offset).format("%H:%M").to_string()
        };

        Ok(PrayerTimes {
            fajr: local(times.time(Prayer::Fajr)),
            dhuhr: local(times.time(Prayer::Dhuhr)),
            asr: local(times.time(Prayer::Asr)),
            maghrib: local(times.time(Prayer::Maghrib)),
            isha: local(times.time(Prayer::Isha)),
        })
    }
}

fn parse_method(s: &str) -> Result<Method> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::window::to_minutes;

    fn amman() -> PrayerCalculator {
        PrayerCalculator::new(31.9454, 35.9284, "MuslimWorldLeague", "Shafi", 180).unwrap()
    }

    #[test]
    fn rejects_unknown_method_and_madhab() {
        assert!(PrayerCalculator::new(0.0, 0.0, "Atlantis", "Shafi", 0).is_err());
        assert!(PrayerCalculator::new(0.0, 0.0, "Egyptian", "Maliki", 0).is_err());
    }

    #[test]
    fn computed_times_parse_and_are_ordered() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let times = amman().compute_times(date).unwrap();
        let minutes: Vec<u32> = [&times.fajr, &times.dhuhr, &times.asr, &times.maghrib, &times.isha]
            .iter()
            .map(|t| to_minutes(t).unwrap())
            .collect();
        assert!(minutes.windows(2).all(|w| w[0] < w[1]), "{:?}", times);
        // Amman in March: dawn around 4-5am, sunset around 6pm
        assert!((240..330).contains(&minutes[0]));
        assert!((1050..1140).contains(&minutes[3]));
    }
}
