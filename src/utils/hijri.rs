use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HijriInfo {
    pub day: usize,
    pub month: usize,
    pub year: usize,
}

impl HijriInfo {
    pub fn month_name(&self) -> &'static str {
        hijri_month_name(self.month)
    }

    pub fn formatted(&self) -> String {
        format!("{} {} {}", self.day, self.month_name(), self.year)
    }
}

/// `offset_days` shifts the Gregorian date first, for places whose month
/// starts a day before or after the calculated one.
pub fn to_hijri(date: NaiveDate, offset_days: i32) -> Result<HijriInfo> {
    let adjusted = date + Duration::days(offset_days as i64);
    let hd = HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .map_err(|e| anyhow::anyhow!("Hijri conversion error: {}", e))?;

    Ok(HijriInfo {
        day: hd.day(),
        month: hd.month(),
        year: hd.year(),
    })
}

/// Header line: "3 Ramadan 1445 · Tue 12 Mar 2024", or just the Gregorian
/// part when conversion fails.
pub fn dual_date(date: NaiveDate, offset_days: i32) -> String {
    let gregorian = date.format("%a %d %b %Y").to_string();
    match to_hijri(date, offset_days) {
        Ok(h) => format!("{} · {}", h.formatted(), gregorian),
        Err(e) => {
            log::debug!("{}", e);
            gregorian
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_ramadan_1445() {
        let info = to_hijri(NaiveDate::from_ymd_opt(2024, 3, 25).unwrap(), 0).unwrap();
        assert_eq!(info.month_name(), "Ramadan");
        assert_eq!(info.year, 1445);
    }

    #[test]
    fn offset_moves_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 25).unwrap();
        let base = to_hijri(date, 0).unwrap();
        let shifted = to_hijri(date, 1).unwrap();
        assert_eq!(shifted.day, base.day + 1);
    }

    #[test]
    fn dual_date_always_carries_gregorian() {
        let line = dual_date(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(), 0);
        assert!(line.ends_with("Tue 12 Mar 2024"));
    }

    #[test]
    fn month_names_are_bounded() {
        assert_eq!(hijri_month_name(0), "Unknown");
        assert_eq!(hijri_month_name(13), "Unknown");
        assert_eq!(hijri_month_name(9), "Ramadan");
    }
}
