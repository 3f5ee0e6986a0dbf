use chrono::{NaiveDate, NaiveDateTime};
use std::time::{Duration, Instant};

use crate::models::{DailyProgress, PrayerTimes, Task, TaskId};
use crate::prayer_times::PrayerTimeSource;
use crate::timeline::catalog::{build_catalog, PrayerMinutes};
use crate::timeline::classify::{current_obligation, next_prayer, timeline_view, TaskView};
use crate::timeline::error::CatalogError;
use crate::timeline::notify::Subscription;
use crate::timeline::reconcile::{completion_map, CompletionMap, DaySnapshot, Reconciler};
use crate::timeline::ticker::{minute_of_day, Ticker};

/// Everything known about one calendar day: its catalog (or why there is
/// none) and the completion state last loaded for it.
#[derive(Debug, Clone)]
pub struct Day {
    pub date: NaiveDate,
    pub times: PrayerTimes,
    pub catalog: Vec<Task>,
    pub minutes: Option<PrayerMinutes>,
    pub error: Option<CatalogError>,
    pub completion: CompletionMap,
    pub snapshot: DaySnapshot,
}

impl Day {
    pub fn build(date: NaiveDate, times: &PrayerTimes) -> Self {
        let (catalog, minutes, error) = match build_catalog(times, date) {
            Ok(catalog) => (catalog, PrayerMinutes::parse(times).ok(), None),
            Err(e) => {
                log::warn!("no timeline for {}: {}", date, e);
                (Vec::new(), None, Some(e))
            }
        };
        Self {
            date,
            times: times.clone(),
            catalog,
            minutes,
            error,
            completion: CompletionMap::new(),
            snapshot: DaySnapshot::default(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.error.is_none()
    }

    pub fn reload(&mut self, reconciler: &Reconciler, user: &str) {
        if !self.has_data() {
            return;
        }
        self.snapshot = reconciler.snapshot(user, self.date);
        self.completion = completion_map(&self.catalog, &self.snapshot);
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.catalog.iter().find(|t| t.id == id)
    }

    pub fn is_completed(&self, id: TaskId) -> bool {
        self.completion.get(&id).copied().unwrap_or(false)
    }

    pub fn view(&self, now_minute: u32) -> Vec<TaskView> {
        timeline_view(&self.catalog, &self.completion, now_minute)
    }

    pub fn obligation(&self, now_minute: u32) -> Option<TaskId> {
        self.minutes
            .as_ref()
            .and_then(|m| current_obligation(m, &self.completion, now_minute))
    }

    pub fn next_prayer(&self, now_minute: u32) -> Option<(TaskId, u32)> {
        next_prayer(&self.catalog, &self.completion, now_minute)
    }

    /// Counts come from the records themselves, so Al-Kahf on a Friday is
    /// included even though it has no timeline slot.
    pub fn progress(&self) -> DailyProgress {
        self.snapshot.progress(self.date)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub rebuilt: bool,
    pub reloaded: bool,
    pub stats_due: bool,
}

/// Owns the current day and keeps it fresh: rebuilds on date rollover,
/// reloads on the classification tick and whenever a change is broadcast.
pub struct Timeline {
    user: String,
    reconciler: Reconciler,
    source: Box<dyn PrayerTimeSource>,
    changes: Subscription,
    classify_tick: Ticker,
    stats_tick: Ticker,
    pub day: Day,
}

impl Timeline {
    pub fn new(
        user: &str,
        reconciler: Reconciler,
        source: Box<dyn PrayerTimeSource>,
        classify_every: Duration,
        stats_every: Duration,
        today: NaiveDate,
    ) -> Self {
        let changes = reconciler.bus().subscribe();
        let mut day = Day::build(today, &source.times_for(today));
        day.reload(&reconciler, user);
        Self {
            user: user.to_string(),
            reconciler,
            source,
            changes,
            classify_tick: Ticker::new(classify_every),
            stats_tick: Ticker::new(stats_every),
            day,
        }
    }

    pub fn tick(&mut self, now: NaiveDateTime, instant: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if now.date() != self.day.date {
            log::info!("day rolled over to {}", now.date());
            self.day = Day::build(now.date(), &self.source.times_for(now.date()));
            self.day.reload(&self.reconciler, &self.user);
            self.changes.changed();
            outcome.rebuilt = true;
            outcome.reloaded = true;
        } else {
            let due = self.classify_tick.due(instant);
            if self.changes.changed() || due {
                self.day.reload(&self.reconciler, &self.user);
                outcome.reloaded = true;
            }
        }

        outcome.stats_due = self.stats_tick.due(instant) || outcome.reloaded;
        outcome
    }

    pub fn now_view(&self, now: NaiveDateTime) -> Vec<TaskView> {
        self.day.view(minute_of_day(now.time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::classify::TaskStatus;
    use crate::timeline::reconcile::tests::{date, reconciler};

    struct Fixed(PrayerTimes);

    impl PrayerTimeSource for Fixed {
        fn times_for(&self, _date: NaiveDate) -> PrayerTimes {
            self.0.clone()
        }
    }

    fn timeline(reconciler: Reconciler) -> Timeline {
        Timeline::new(
            "u1",
            reconciler,
            Box::new(Fixed(PrayerTimes::fallback())),
            Duration::from_secs(60),
            Duration::from_secs(30),
            date(),
        )
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn broken_times_mean_no_data() {
        let day = Day::build(date(), &PrayerTimes::new("05:15", "", "15:45", "18:20", "19:45"));
        assert!(!day.has_data());
        assert!(day.view(600).is_empty());
        assert_eq!(day.obligation(600), None);
    }

    #[test]
    fn reloads_when_another_writer_broadcasts() {
        let (reconciler, _) = reconciler();
        let writer = reconciler.clone();
        let mut timeline = timeline(reconciler);
        let t0 = Instant::now();
        timeline.tick(at(6, 0), t0);

        let fajr = timeline.day.task(TaskId::Fajr).cloned().unwrap();
        writer.set_completion("u1", date(), &fajr, true).unwrap();

        let outcome = timeline.tick(at(6, 0), t0 + Duration::from_secs(1));
        assert!(outcome.reloaded);
        assert!(timeline.day.is_completed(TaskId::Fajr));
    }

    #[test]
    fn quiet_ticks_do_not_reload() {
        let (reconciler, _) = reconciler();
        let mut timeline = timeline(reconciler);
        let t0 = Instant::now();
        assert!(timeline.tick(at(6, 0), t0).reloaded);
        assert!(!timeline.tick(at(6, 0), t0 + Duration::from_secs(10)).reloaded);
        assert!(timeline.tick(at(6, 1), t0 + Duration::from_secs(60)).reloaded);
    }

    #[test]
    fn rolls_over_at_midnight() {
        let (reconciler, _) = reconciler();
        let writer = reconciler.clone();
        let mut timeline = timeline(reconciler);
        let isha = timeline.day.task(TaskId::Isha).cloned().unwrap();
        writer.set_completion("u1", date(), &isha, true).unwrap();

        let tomorrow = date().succ_opt().unwrap().and_hms_opt(0, 1, 0).unwrap();
        let outcome = timeline.tick(tomorrow, Instant::now());
        assert!(outcome.rebuilt);
        assert_eq!(timeline.day.date, tomorrow.date());
        assert!(!timeline.day.is_completed(TaskId::Isha));
        let view = timeline.now_view(tomorrow);
        assert!(view.iter().all(|v| v.status == TaskStatus::Upcoming));
    }
}
