use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{AthkarRecord, PrayerRecord, QuranRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub done: u8,
    pub total: u8,
}

/// Completion summary for one user on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub prayers: Tally,
    pub athkar: Tally,
    pub quran: Tally,
}

impl DailyProgress {
    /// Al-Kahf joins the Quran tasks on Fridays.
    pub fn from_records(
        date: NaiveDate,
        prayers: &PrayerRecord,
        quran: &[QuranRecord],
        athkar: &[AthkarRecord],
    ) -> Self {
        let quran_total = if date.weekday() == Weekday::Fri { 3 } else { 2 };
        Self {
            prayers: Tally {
                done: prayers.done_count(),
                total: 5,
            },
            athkar: Tally {
                done: athkar.iter().filter(|a| a.completed).count() as u8,
                total: 2,
            },
            quran: Tally {
                done: quran.iter().filter(|q| q.completed).count() as u8,
                total: quran_total,
            },
        }
    }

    pub fn completed(&self) -> u8 {
        self.prayers.done + self.athkar.done + self.quran.done
    }

    pub fn total(&self) -> u8 {
        self.prayers.total + self.athkar.total + self.quran.total
    }

    pub fn percent(&self) -> u8 {
        if self.total() == 0 {
            0
        } else {
            ((self.completed() as f64 / self.total() as f64) * 100.0).round() as u8
        }
    }
}

/// One row of the trailing-week summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDay {
    pub date: NaiveDate,
    pub prayers_done: u8,
    pub athkar_done: u8,
    pub quran_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthkarType, Surah};

    fn quran(surah: Surah, completed: bool) -> QuranRecord {
        QuranRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            surah,
            pages_read: 1,
            current_ayah: 0,
            target_pages: 1,
            completed,
        }
    }

    #[test]
    fn friday_adds_kahf_to_the_total() {
        // 2024-03-15 is a Friday
        let friday = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let progress = DailyProgress::from_records(friday, &PrayerRecord::default(), &[], &[]);
        assert_eq!(progress.total(), 10);

        let thursday = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let progress = DailyProgress::from_records(thursday, &PrayerRecord::default(), &[], &[]);
        assert_eq!(progress.total(), 9);
    }

    #[test]
    fn percent_rounds() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let prayers = PrayerRecord {
            fajr: true,
            dhuhr: true,
            ..Default::default()
        };
        let athkar = vec![AthkarRecord {
            date,
            athkar_type: AthkarType::Morning,
            completed: true,
        }];
        let progress = DailyProgress::from_records(
            date,
            &prayers,
            &[quran(Surah::Baqarah, true), quran(Surah::Mulk, false)],
            &athkar,
        );
        assert_eq!(progress.completed(), 4);
        // 4 / 9 = 44.4%
        assert_eq!(progress.percent(), 44);
    }
}
