//! Clock-string arithmetic and the fixed activity windows of the day.
//!
//! Every time in the timeline is a day-local minute in `0..1440`.

use chrono::{NaiveTime, Timelike};

use crate::models::PrayerType;
use crate::timeline::error::TimeFormatError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Morning athkar slot opens this long after Fajr.
pub const MORNING_ATHKAR_AFTER_FAJR: u32 = 30;
/// Baqarah reading slot opens this long after Fajr.
pub const BAQARAH_AFTER_FAJR: u32 = 60;
/// Evening athkar slot on the timeline sits this long after Maghrib.
pub const EVENING_ATHKAR_AFTER_MAGHRIB: u32 = 30;
/// Evening athkar becomes the header obligation this long after Asr.
pub const EVENING_ATHKAR_AFTER_ASR: u32 = 60;
/// Al-Mulk is anchored two minutes before midnight.
pub const MULK_MINUTE: u32 = 23 * 60 + 58;
/// A past, unfinished task turns "missed" this many minutes before the next
/// task starts.
pub const MISSED_LOOKAHEAD: u32 = 2;

pub const MORNING_ATHKAR_HOURS: Window = Window::new(6 * 60, 12 * 60);
pub const BAQARAH_HOURS: Window = Window::new(8 * 60, 12 * 60);
pub const MULK_HOURS: Window = Window::new(20 * 60, 23 * 60 + 30);

/// Half-open `[start, end)` span of day-local minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u32,
    pub end: u32,
}

impl Window {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }
}

/// Parse a 24-hour `HH:MM` string into minutes since local midnight.
pub fn to_minutes(time: &str) -> Result<u32, TimeFormatError> {
    let err = || TimeFormatError {
        input: time.to_string(),
    };

    // chrono alone would accept "5:15" and " 5:15"; stored times are always zero-padded
    let padded = time.len() == 5
        && time
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 2 { b == b':' } else { b.is_ascii_digit() });
    if !padded {
        return Err(err());
    }
    let parsed = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| err())?;
    Ok(parsed.hour() * 60 + parsed.minute())
}

/// Inverse of [`to_minutes`] on `0..1440`.
pub fn format_minutes(minute: u32) -> String {
    let minute = minute % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Add an offset without spilling into the next day.
pub fn offset(minute: u32, by: u32) -> u32 {
    (minute + by).min(MINUTES_PER_DAY - 1)
}

pub fn grace_window(prayer: PrayerType, adhan: u32) -> Window {
    Window::new(adhan, adhan + prayer.grace_minutes())
}

/// From an hour after Asr until Maghrib.
pub fn evening_athkar_window(asr: u32, maghrib: u32) -> Window {
    Window::new(asr + EVENING_ATHKAR_AFTER_ASR, maghrib)
}
