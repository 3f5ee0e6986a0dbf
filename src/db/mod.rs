pub mod migrations;
pub mod repository;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::models::{AthkarRecord, AthkarType, PrayerRecord, PrayerType, QuranRecord, Surah, WeeklyDay};
use crate::timeline::catalog::baqarah_target_page;
use crate::timeline::error::StoreError;
use crate::timeline::reconcile::{CompletionStore, QuranProgress};

use repository::{AthkarRepo, PrayerRepo, QuranRepo, StatsRepo};

/// SQLite-backed completion store. One connection, serialised behind a
/// mutex so the concurrent day fetch can share it.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Direct access for the repositories that sit outside the completion
    /// store (cache, meta, stats).
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn weekly(&self, user: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeeklyDay>> {
        StatsRepo::weekly(&self.conn(), user, start, end)
    }
}

impl CompletionStore for SqliteStore {
    fn prayers(&self, user: &str, date: NaiveDate) -> Result<Option<PrayerRecord>, StoreError> {
        PrayerRepo::get(&self.conn(), user, date).map_err(StoreError::Fetch)
    }

    fn quran(&self, user: &str, date: NaiveDate) -> Result<Vec<QuranRecord>, StoreError> {
        QuranRepo::get_for_date(&self.conn(), user, date).map_err(StoreError::Fetch)
    }

    fn athkar(&self, user: &str, date: NaiveDate) -> Result<Vec<AthkarRecord>, StoreError> {
        AthkarRepo::get_for_date(&self.conn(), user, date).map_err(StoreError::Fetch)
    }

    fn set_prayer(&self, user: &str, date: NaiveDate, prayer: PrayerType, done: bool) -> Result<(), StoreError> {
        PrayerRepo::set(&self.conn(), user, date, prayer, done).map_err(StoreError::Mutation)
    }

    fn set_quran(&self, user: &str, date: NaiveDate, surah: Surah, progress: QuranProgress) -> Result<(), StoreError> {
        let target = match surah {
            Surah::Baqarah => baqarah_target_page(date.weekday()) as i32,
            Surah::Mulk | Surah::Kahf => 1,
        };
        QuranRepo::upsert(
            &self.conn(),
            user,
            date,
            surah,
            progress.pages_read,
            progress.current_ayah,
            target,
            progress.completed,
        )
        .map_err(StoreError::Mutation)
    }

    fn set_athkar(&self, user: &str, date: NaiveDate, athkar: AthkarType, completed: bool) -> Result<(), StoreError> {
        AthkarRepo::upsert(&self.conn(), user, date, athkar, completed).map_err(StoreError::Mutation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nooruna.db");
        let date = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(); // Saturday

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set_prayer("u1", date, PrayerType::Maghrib, true).unwrap();
            store
                .set_quran("u1", date, Surah::Baqarah, QuranProgress { pages_read: 1, current_ayah: 0, completed: true })
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.prayers("u1", date).unwrap().unwrap().maghrib);
        let quran = store.quran("u1", date).unwrap();
        assert_eq!(quran[0].target_pages, 1);
        assert!(quran[0].completed);
    }

    #[test]
    fn missing_rows_read_as_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert_eq!(store.prayers("nobody", date).unwrap(), None);
        assert!(store.quran("nobody", date).unwrap().is_empty());
        assert!(store.athkar("nobody", date).unwrap().is_empty());
    }
}
