pub mod calculator;
pub mod provider;

pub use calculator::PrayerCalculator;
pub use provider::{CachedTimes, PrayerTimeSource};
