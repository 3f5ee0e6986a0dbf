use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerType {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerType {
    pub fn all() -> [PrayerType; 5] {
        [
            PrayerType::Fajr,
            PrayerType::Dhuhr,
            PrayerType::Asr,
            PrayerType::Maghrib,
            PrayerType::Isha,
        ]
    }

    /// Column name in the `prayers` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "fajr",
            PrayerType::Dhuhr => "dhuhr",
            PrayerType::Asr => "asr",
            PrayerType::Maghrib => "maghrib",
            PrayerType::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerType::Fajr => "Fajr",
            PrayerType::Dhuhr => "Dhuhr",
            PrayerType::Asr => "Asr",
            PrayerType::Maghrib => "Maghrib",
            PrayerType::Isha => "Isha",
        }
    }

    /// Minutes after the adhan during which the prayer counts as the
    /// currently due obligation.
    pub fn grace_minutes(&self) -> u32 {
        match self {
            PrayerType::Fajr => 75,
            PrayerType::Dhuhr => 90,
            PrayerType::Asr => 90,
            PrayerType::Maghrib => 40,
            PrayerType::Isha => 60,
        }
    }
}

impl std::fmt::Display for PrayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Raw prayer times as handed over by a provider, one `HH:MM` string each.
/// Nothing is validated until the catalog is built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrayerTimes {
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl PrayerTimes {
    pub fn new(fajr: &str, dhuhr: &str, asr: &str, maghrib: &str, isha: &str) -> Self {
        Self {
            fajr: fajr.to_string(),
            dhuhr: dhuhr.to_string(),
            asr: asr.to_string(),
            maghrib: maghrib.to_string(),
            isha: isha.to_string(),
        }
    }

    /// Times used whenever the provider fails.
    pub fn fallback() -> Self {
        Self::new("05:15", "12:30", "15:45", "18:20", "19:45")
    }

    pub fn get(&self, prayer: PrayerType) -> &str {
        match prayer {
            PrayerType::Fajr => &self.fajr,
            PrayerType::Dhuhr => &self.dhuhr,
            PrayerType::Asr => &self.asr,
            PrayerType::Maghrib => &self.maghrib,
            PrayerType::Isha => &self.isha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grace_windows() {
        let widths: Vec<u32> = PrayerType::all().iter().map(|p| p.grace_minutes()).collect();
        assert_eq!(widths, vec![75, 90, 90, 40, 60]);
    }

    #[test]
    fn prayer_times_serialize_with_provider_keys() {
        let json = serde_json::to_string(&PrayerTimes::fallback()).unwrap();
        assert!(json.contains("\"Fajr\":\"05:15\""));
        assert!(json.contains("\"Isha\":\"19:45\""));
    }
}
