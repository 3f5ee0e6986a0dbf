use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::MetaRepo;
use crate::db::SqliteStore;
use crate::models::{DailyProgress, WeeklyDay};
use crate::prayer_times::{CachedTimes, PrayerCalculator};
use crate::timeline::{ChangeBus, Reconciler, Timeline};

/// Everything the CLI and TUI share, built once in `main`.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<SqliteStore>,
    pub reconciler: Reconciler,
}

impl AppContext {
    pub fn new(config: AppConfig, store: SqliteStore) -> Self {
        let store = Arc::new(store);
        let reconciler = Reconciler::new(store.clone(), Arc::new(ChangeBus::new()));
        Self {
            config,
            store,
            reconciler,
        }
    }

    pub fn user(&self) -> &str {
        &self.config.user.id
    }

    /// A location that fails validation still yields a source; it just
    /// serves cached or default times.
    pub fn times_source(&self) -> CachedTimes {
        let calculator = match PrayerCalculator::from_config(&self.config.location) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("location config rejected: {}", e);
                None
            }
        };
        CachedTimes::new(calculator, self.store.clone())
    }

    pub fn timeline(&self, today: NaiveDate) -> Timeline {
        let timeline = &self.config.timeline;
        Timeline::new(
            self.user(),
            self.reconciler.clone(),
            Box::new(self.times_source()),
            timeline.classify_interval(),
            timeline.stats_interval(),
            today,
        )
    }

    pub fn partner_progress(&self, date: NaiveDate) -> Option<(String, DailyProgress)> {
        let partner = self.config.user.partner_id.as_ref()?;
        let progress = self.reconciler.snapshot(partner, date).progress(date);
        Some((partner.clone(), progress))
    }

    /// Today and the six days before it.
    pub fn weekly(&self, user: &str, today: NaiveDate) -> Result<Vec<WeeklyDay>> {
        self.store.weekly(user, today - Duration::days(6), today)
    }

    pub fn is_setup_done(&self) -> bool {
        matches!(
            MetaRepo::get(&self.store.conn(), "setup_done"),
            Ok(Some(ref v)) if v == "1"
        )
    }

    pub fn mark_setup_done(&self) -> Result<()> {
        MetaRepo::set(&self.store.conn(), "setup_done", "1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;

    fn context(partner: Option<&str>) -> AppContext {
        let mut config = AppConfig::default();
        config.user.id = "me".to_string();
        config.user.partner_id = partner.map(str::to_string);
        AppContext::new(config, SqliteStore::open_in_memory().unwrap())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap() // Friday
    }

    #[test]
    fn partner_progress_reads_the_partners_records() {
        let ctx = context(Some("them"));
        let timeline = ctx.timeline(date());
        let fajr = timeline.day.task(TaskId::Fajr).cloned().unwrap();
        ctx.reconciler.set_completion("them", date(), &fajr, true).unwrap();

        let (name, progress) = ctx.partner_progress(date()).unwrap();
        assert_eq!(name, "them");
        assert_eq!(progress.prayers.done, 1);
        assert_eq!(progress.quran.total, 3);
        assert!(context(None).partner_progress(date()).is_none());
    }

    #[test]
    fn weekly_covers_seven_days_ending_today() {
        let ctx = context(None);
        let week = ctx.weekly("me", date()).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[6].date, date());
        assert_eq!(week[0].date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn setup_flag_persists_in_meta() {
        let ctx = context(None);
        assert!(!ctx.is_setup_done());
        ctx.mark_setup_done().unwrap();
        assert!(ctx.is_setup_done());
    }
}
