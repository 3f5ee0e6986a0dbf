use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{AthkarType, PrayerType, Surah};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Prayer,
    Athkar,
    Quran,
}

/// Stable key of a timeline slot. Serialized as the kebab-case id used on
/// the command line and in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskId {
    Fajr,
    #[serde(rename = "athkar-morning")]
    MorningAthkar,
    Baqarah,
    Dhuhr,
    Asr,
    Maghrib,
    #[serde(rename = "athkar-evening")]
    EveningAthkar,
    Isha,
    Mulk,
}

/// Which persisted record a task reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKey {
    Prayer(PrayerType),
    Quran(Surah),
    Athkar(AthkarType),
}

impl TaskId {
    pub fn all() -> [TaskId; 9] {
        [
            TaskId::Fajr,
            TaskId::MorningAthkar,
            TaskId::Baqarah,
            TaskId::Dhuhr,
            TaskId::Asr,
            TaskId::Maghrib,
            TaskId::EveningAthkar,
            TaskId::Isha,
            TaskId::Mulk,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::Fajr => "fajr",
            TaskId::MorningAthkar => "athkar-morning",
            TaskId::Baqarah => "baqarah",
            TaskId::Dhuhr => "dhuhr",
            TaskId::Asr => "asr",
            TaskId::Maghrib => "maghrib",
            TaskId::EveningAthkar => "athkar-evening",
            TaskId::Isha => "isha",
            TaskId::Mulk => "mulk",
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self.key() {
            CompletionKey::Prayer(_) => TaskKind::Prayer,
            CompletionKey::Quran(_) => TaskKind::Quran,
            CompletionKey::Athkar(_) => TaskKind::Athkar,
        }
    }

    pub fn key(&self) -> CompletionKey {
        match self {
            TaskId::Fajr => CompletionKey::Prayer(PrayerType::Fajr),
            TaskId::Dhuhr => CompletionKey::Prayer(PrayerType::Dhuhr),
            TaskId::Asr => CompletionKey::Prayer(PrayerType::Asr),
            TaskId::Maghrib => CompletionKey::Prayer(PrayerType::Maghrib),
            TaskId::Isha => CompletionKey::Prayer(PrayerType::Isha),
            TaskId::MorningAthkar => CompletionKey::Athkar(AthkarType::Morning),
            TaskId::EveningAthkar => CompletionKey::Athkar(AthkarType::Evening),
            TaskId::Baqarah => CompletionKey::Quran(Surah::Baqarah),
            TaskId::Mulk => CompletionKey::Quran(Surah::Mulk),
        }
    }

    /// Field name on the persisted record; athkar slots derive their key
    /// from the id instead.
    pub fn storage_field(&self) -> Option<&'static str> {
        match self.key() {
            CompletionKey::Prayer(p) => Some(p.as_str()),
            CompletionKey::Quran(s) => Some(s.as_str()),
            CompletionKey::Athkar(_) => None,
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        TaskId::all()
            .into_iter()
            .find(|id| id.as_str() == lowered)
            .or_else(|| match lowered.as_str() {
                "zuhr" => Some(TaskId::Dhuhr),
                "morning" => Some(TaskId::MorningAthkar),
                "evening" => Some(TaskId::EveningAthkar),
                _ => None,
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown task '{}'. Use: fajr, athkar-morning, baqarah, dhuhr, asr, maghrib, athkar-evening, isha, mulk",
                    s
                )
            })
    }
}

/// One slot of the day's timeline. Built once per day, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub kind: TaskKind,
    pub scheduled_minute: u32,
    pub display_time: String,
    pub storage_field: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_str() {
        for id in TaskId::all() {
            assert_eq!(id.as_str().parse::<TaskId>().unwrap(), id);
        }
        assert_eq!("evening".parse::<TaskId>().unwrap(), TaskId::EveningAthkar);
        assert!("kahf".parse::<TaskId>().is_err());
    }

    #[test]
    fn athkar_tasks_have_no_storage_field() {
        assert_eq!(TaskId::MorningAthkar.storage_field(), None);
        assert_eq!(TaskId::Dhuhr.storage_field(), Some("dhuhr"));
        assert_eq!(TaskId::Mulk.storage_field(), Some("mulk"));
        assert_eq!(TaskId::Baqarah.kind(), TaskKind::Quran);
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&TaskId::MorningAthkar).unwrap();
        assert_eq!(json, "\"athkar-morning\"");
    }
}
