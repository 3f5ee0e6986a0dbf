use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use crate::models::{
    AthkarRecord, AthkarType, CompletionKey, DailyProgress, PrayerRecord, PrayerType,
    QuranRecord, Surah, Task, TaskId, FULLY_READ_PAGES,
};
use crate::timeline::catalog::baqarah_target_page;
use crate::timeline::error::StoreError;
use crate::timeline::notify::ChangeBus;

pub type CompletionMap = HashMap<TaskId, bool>;

/// The three per-day completion stores. Every write is an upsert on
/// (user, date, natural key).
pub trait CompletionStore: Send + Sync {
    fn prayers(&self, user: &str, date: NaiveDate) -> Result<Option<PrayerRecord>, StoreError>;
    fn quran(&self, user: &str, date: NaiveDate) -> Result<Vec<QuranRecord>, StoreError>;
    fn athkar(&self, user: &str, date: NaiveDate) -> Result<Vec<AthkarRecord>, StoreError>;

    fn set_prayer(
        &self,
        user: &str,
        date: NaiveDate,
        prayer: PrayerType,
        done: bool,
    ) -> Result<(), StoreError>;
    fn set_quran(
        &self,
        user: &str,
        date: NaiveDate,
        surah: Surah,
        progress: QuranProgress,
    ) -> Result<(), StoreError>;
    fn set_athkar(
        &self,
        user: &str,
        date: NaiveDate,
        athkar: AthkarType,
        completed: bool,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuranProgress {
    pub pages_read: i32,
    pub current_ayah: i32,
    pub completed: bool,
}

/// Everything persisted for one user on one day. Missing records read as
/// not started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySnapshot {
    pub prayers: PrayerRecord,
    pub quran: Vec<QuranRecord>,
    pub athkar: Vec<AthkarRecord>,
}

impl DaySnapshot {
    pub fn is_completed(&self, id: TaskId) -> bool {
        match id.key() {
            CompletionKey::Prayer(p) => self.prayers.get(p),
            CompletionKey::Quran(s) => self
                .quran
                .iter()
                .find(|q| q.surah == s)
                .is_some_and(|q| q.completed),
            CompletionKey::Athkar(a) => self
                .athkar
                .iter()
                .find(|r| r.athkar_type == a)
                .is_some_and(|r| r.completed),
        }
    }

    pub fn progress(&self, date: NaiveDate) -> DailyProgress {
        DailyProgress::from_records(date, &self.prayers, &self.quran, &self.athkar)
    }
}

/// Match every catalog task against its record.
pub fn completion_map(catalog: &[Task], snapshot: &DaySnapshot) -> CompletionMap {
    catalog
        .iter()
        .map(|task| (task.id, snapshot.is_completed(task.id)))
        .collect()
}

/// Issue the three fetches at once and wait for all of them. A failed fetch
/// is logged and treated as "nothing recorded yet".
pub fn fetch_day(store: &dyn CompletionStore, user: &str, date: NaiveDate) -> DaySnapshot {
    let (prayers, quran, athkar) = thread::scope(|s| {
        let prayers = s.spawn(|| store.prayers(user, date));
        let quran = s.spawn(|| store.quran(user, date));
        let athkar = s.spawn(|| store.athkar(user, date));
        (
            prayers.join().unwrap_or_else(|_| Err(panicked())),
            quran.join().unwrap_or_else(|_| Err(panicked())),
            athkar.join().unwrap_or_else(|_| Err(panicked())),
        )
    });

    DaySnapshot {
        prayers: recover(prayers, "prayers", user).flatten().unwrap_or_default(),
        quran: recover(quran, "quran progress", user).unwrap_or_default(),
        athkar: recover(athkar, "athkar progress", user).unwrap_or_default(),
    }
}

fn panicked() -> StoreError {
    StoreError::Unavailable("fetch thread panicked".to_string())
}

fn recover<T>(result: Result<T, StoreError>, what: &str, user: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("loading {} for '{}' failed, treating as empty: {}", what, user, e);
            None
        }
    }
}

/// Reads and writes completion state and tells everyone else when it
/// changed.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn CompletionStore>,
    bus: Arc<ChangeBus>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CompletionStore>, bus: Arc<ChangeBus>) -> Self {
        Self { store, bus }
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn snapshot(&self, user: &str, date: NaiveDate) -> DaySnapshot {
        fetch_day(self.store.as_ref(), user, date)
    }

    pub fn load_completion_map(&self, user: &str, date: NaiveDate, catalog: &[Task]) -> CompletionMap {
        completion_map(catalog, &self.snapshot(user, date))
    }

    /// Mark a task done or not done. Quran tasks marked done are stored as
    /// fully read; unmarking resets them to not started.
    pub fn set_completion(
        &self,
        user: &str,
        date: NaiveDate,
        task: &Task,
        completed: bool,
    ) -> Result<(), StoreError> {
        match task.id.key() {
            CompletionKey::Prayer(prayer) => {
                self.store.set_prayer(user, date, prayer, completed)?;
            }
            CompletionKey::Athkar(athkar) => {
                self.store.set_athkar(user, date, athkar, completed)?;
            }
            CompletionKey::Quran(surah) => {
                let pages = if completed { FULLY_READ_PAGES } else { 0 };
                self.write_quran(user, date, surah, pages, completed)?;
            }
        }
        log::info!("{} -> {} for '{}' on {}", task.id, completed, user, date);
        self.bus.publish();
        Ok(())
    }

    /// Progress reported back by the Quran reader.
    pub fn record_reading(
        &self,
        user: &str,
        date: NaiveDate,
        surah: Surah,
        page: i32,
        completed: bool,
    ) -> Result<(), StoreError> {
        self.write_quran(user, date, surah, page, completed)?;
        log::info!("{} read to page {} for '{}'", surah.as_str(), page, user);
        self.bus.publish();
        Ok(())
    }

    /// Baqarah only counts as done once today's page has been reached.
    fn write_quran(
        &self,
        user: &str,
        date: NaiveDate,
        surah: Surah,
        pages_read: i32,
        completed: bool,
    ) -> Result<(), StoreError> {
        let completed = match surah {
            Surah::Baqarah => {
                completed && pages_read >= baqarah_target_page(date.weekday()) as i32
            }
            Surah::Mulk | Surah::Kahf => completed,
        };
        self.store.set_quran(
            user,
            date,
            surah,
            QuranProgress {
                pages_read,
                current_ayah: 0,
                completed,
            },
        )
    }
}
