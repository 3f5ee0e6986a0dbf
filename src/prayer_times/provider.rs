use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::db::repository::CacheRepo;
use crate::db::SqliteStore;
use crate::models::PrayerTimes;
use crate::prayer_times::PrayerCalculator;

/// Anything that can hand over the five prayer times for a date. Never
/// fails: implementations substitute defaults and log instead.
pub trait PrayerTimeSource {
    fn times_for(&self, date: NaiveDate) -> PrayerTimes;
}

/// Calculator in front of the `prayer_times_cache` table.
pub struct CachedTimes {
    calculator: Option<PrayerCalculator>,
    store: Arc<SqliteStore>,
}

impl CachedTimes {
    pub fn new(calculator: Option<PrayerCalculator>, store: Arc<SqliteStore>) -> Self {
        Self { calculator, store }
    }

    fn lookup(&self, date: NaiveDate) -> Result<PrayerTimes> {
        if let Some(cached) = CacheRepo::get_times_for_date(&self.store.conn(), date)? {
            return Ok(cached);
        }
        let calculator = self
            .calculator
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no valid location configured"))?;
        let times = calculator.compute_times(date)?;
        CacheRepo::store_times(&self.store.conn(), date, &times)?;
        Ok(times)
    }

    /// Fill the cache for `today` and the following `days_ahead` days.
    pub fn warm(&self, today: NaiveDate, days_ahead: u32) -> Result<()> {
        for date in today.iter_days().take(days_ahead as usize + 1) {
            self.lookup(date)?;
        }
        Ok(())
    }

    /// Drop every cached day, e.g. after the location changed.
    pub fn invalidate(&self) -> Result<()> {
        CacheRepo::clear_all(&self.store.conn())
    }
}

impl PrayerTimeSource for CachedTimes {
    fn times_for(&self, date: NaiveDate) -> PrayerTimes {
        match self.lookup(date) {
            Ok(times) => times,
            Err(e) => {
                log::warn!("prayer times for {} unavailable, using defaults: {}", date, e);
                PrayerTimes::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
    }

    #[test]
    fn missing_calculator_falls_back_to_defaults() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let source = CachedTimes::new(None, store);
        assert_eq!(source.times_for(date()), PrayerTimes::fallback());
    }

    #[test]
    fn cached_day_wins_over_calculation() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let pinned = PrayerTimes::new("04:40", "12:00", "15:20", "18:00", "19:20");
        CacheRepo::store_times(&store.conn(), date(), &pinned).unwrap();

        let calculator = PrayerCalculator::new(31.9454, 35.9284, "MuslimWorldLeague", "Shafi", 180).unwrap();
        let source = CachedTimes::new(Some(calculator), store.clone());
        assert_eq!(source.times_for(date()), pinned);

        source.warm(date(), 2).unwrap();
        let cached: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM prayer_times_cache", [], |row| row.get(0))
            .unwrap();
        assert_eq!(cached, 3);

        source.invalidate().unwrap();
        let computed = source.times_for(date());
        assert_ne!(computed, pinned);
        assert_eq!(CacheRepo::get_times_for_date(&store.conn(), date()).unwrap(), Some(computed));
    }
}
