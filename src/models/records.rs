use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::PrayerType;

/// Pages value written when a surah is marked fully read in one gesture.
pub const FULLY_READ_PAGES: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surah {
    Baqarah,
    Mulk,
    Kahf,
}

impl Surah {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surah::Baqarah => "baqarah",
            Surah::Mulk => "mulk",
            Surah::Kahf => "kahf",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Surah::Baqarah => "Surah Al-Baqarah",
            Surah::Mulk => "Surah Al-Mulk",
            Surah::Kahf => "Surah Al-Kahf",
        }
    }
}

impl FromStr for Surah {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baqarah" | "al-baqarah" => Ok(Surah::Baqarah),
            "mulk" | "al-mulk" => Ok(Surah::Mulk),
            "kahf" | "al-kahf" => Ok(Surah::Kahf),
            _ => Err(anyhow::anyhow!("Unknown surah: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AthkarType {
    Morning,
    Evening,
}

impl AthkarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AthkarType::Morning => "morning",
            AthkarType::Evening => "evening",
        }
    }
}

impl FromStr for AthkarType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(AthkarType::Morning),
            "evening" => Ok(AthkarType::Evening),
            _ => Err(anyhow::anyhow!("Unknown athkar type: {}", s)),
        }
    }
}

/// One row per (user, date). A missing row reads as all-false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerRecord {
    pub fajr: bool,
    pub dhuhr: bool,
    pub asr: bool,
    pub maghrib: bool,
    pub isha: bool,
}

impl PrayerRecord {
    pub fn get(&self, prayer: PrayerType) -> bool {
        match prayer {
            PrayerType::Fajr => self.fajr,
            PrayerType::Dhuhr => self.dhuhr,
            PrayerType::Asr => self.asr,
            PrayerType::Maghrib => self.maghrib,
            PrayerType::Isha => self.isha,
        }
    }

    pub fn done_count(&self) -> u8 {
        PrayerType::all().iter().filter(|p| self.get(**p)).count() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuranRecord {
    pub date: NaiveDate,
    pub surah: Surah,
    pub pages_read: i32,
    pub current_ayah: i32,
    pub target_pages: i32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AthkarRecord {
    pub date: NaiveDate,
    pub athkar_type: AthkarType,
    pub completed: bool,
}
