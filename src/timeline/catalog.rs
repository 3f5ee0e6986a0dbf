use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{PrayerTimes, PrayerType, Task, TaskId};
use crate::timeline::error::CatalogError;
use crate::timeline::window::{
    format_minutes, offset, to_minutes, BAQARAH_AFTER_FAJR, EVENING_ATHKAR_AFTER_MAGHRIB,
    MORNING_ATHKAR_AFTER_FAJR, MULK_MINUTE,
};

/// Prayer times after validation, in day-local minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerMinutes {
    pub fajr: u32,
    pub dhuhr: u32,
    pub asr: u32,
    pub maghrib: u32,
    pub isha: u32,
}

impl PrayerMinutes {
    pub fn parse(times: &PrayerTimes) -> Result<Self, CatalogError> {
        let field = |prayer: PrayerType| -> Result<u32, CatalogError> {
            let raw = times.get(prayer).trim();
            if raw.is_empty() {
                return Err(CatalogError::Missing(prayer));
            }
            to_minutes(raw).map_err(|source| CatalogError::Format { prayer, source })
        };
        Ok(Self {
            fajr: field(PrayerType::Fajr)?,
            dhuhr: field(PrayerType::Dhuhr)?,
            asr: field(PrayerType::Asr)?,
            maghrib: field(PrayerType::Maghrib)?,
            isha: field(PrayerType::Isha)?,
        })
    }

    pub fn get(&self, prayer: PrayerType) -> u32 {
        match prayer {
            PrayerType::Fajr => self.fajr,
            PrayerType::Dhuhr => self.dhuhr,
            PrayerType::Asr => self.asr,
            PrayerType::Maghrib => self.maghrib,
            PrayerType::Isha => self.isha,
        }
    }
}

/// Page of Al-Baqarah due today: Saturday is page 1, Sunday 2, ... Friday 7.
pub fn baqarah_target_page(weekday: Weekday) -> u32 {
    let day = weekday.num_days_from_sunday();
    if weekday == Weekday::Sat { 1 } else { day + 2 }
}

/// Assemble the day's nine tasks in timeline order.
pub fn build_catalog(times: &PrayerTimes, date: NaiveDate) -> Result<Vec<Task>, CatalogError> {
    let m = PrayerMinutes::parse(times)?;
    let page = baqarah_target_page(date.weekday());

    let prayer = |id: TaskId, prayer: PrayerType, title: &str| Task {
        id,
        title: title.to_string(),
        kind: id.kind(),
        scheduled_minute: m.get(prayer),
        display_time: format_minutes(m.get(prayer)),
        storage_field: id.storage_field(),
    };
    let slot = |id: TaskId, title: &str, minute: u32, display: String| Task {
        id,
        title: title.to_string(),
        kind: id.kind(),
        scheduled_minute: minute,
        display_time: display,
        storage_field: id.storage_field(),
    };

    let tasks = vec![
        prayer(TaskId::Fajr, PrayerType::Fajr, "Fajr Prayer"),
        slot(
            TaskId::MorningAthkar,
            "Morning Athkar",
            offset(m.fajr, MORNING_ATHKAR_AFTER_FAJR),
            "after Fajr".to_string(),
        ),
        slot(
            TaskId::Baqarah,
            "Surah Al-Baqarah",
            offset(m.fajr, BAQARAH_AFTER_FAJR),
            format!("Page {}", page),
        ),
        prayer(TaskId::Dhuhr, PrayerType::Dhuhr, "Dhuhr Prayer"),
        prayer(TaskId::Asr, PrayerType::Asr, "Asr Prayer"),
        prayer(TaskId::Maghrib, PrayerType::Maghrib, "Maghrib Prayer"),
        slot(
            TaskId::EveningAthkar,
            "Evening Athkar",
            offset(m.maghrib, EVENING_ATHKAR_AFTER_MAGHRIB),
            "after Maghrib".to_string(),
        ),
        prayer(TaskId::Isha, PrayerType::Isha, "Isha Prayer"),
        slot(
            TaskId::Mulk,
            "Surah Al-Mulk",
            MULK_MINUTE,
            "before sleep".to_string(),
        ),
    ];

    log::debug!("built catalog for {} ({} tasks)", date, tasks.len());
    Ok(tasks)
}
