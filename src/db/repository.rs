use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;

use crate::models::{
    AthkarRecord, AthkarType, PrayerRecord, PrayerTimes, PrayerType, QuranRecord, Surah,
    WeeklyDay,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn day_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn bad_column(e: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::InvalidParameterName(e.to_string())
}

// ─── Cached prayer times ────────────────────────────────────────────────────

pub struct CacheRepo;

impl CacheRepo {
    pub fn get_times_for_date(conn: &Connection, date: NaiveDate) -> Result<Option<PrayerTimes>> {
        let row = conn
            .query_row(
                "SELECT fajr, dhuhr, asr, maghrib, isha FROM prayer_times_cache WHERE date = ?1",
                params![day_key(date)],
                |row| {
                    Ok(PrayerTimes {
                        fajr: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        dhuhr: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        asr: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        maghrib: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        isha: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn clear_all(conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM prayer_times_cache", [])?;
        Ok(())
    }

    pub fn store_times(conn: &Connection, date: NaiveDate, times: &PrayerTimes) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO prayer_times_cache (date, fajr, dhuhr, asr, maghrib, isha)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                day_key(date),
                times.fajr,
                times.dhuhr,
                times.asr,
                times.maghrib,
                times.isha,
            ],
        )?;
        Ok(())
    }
}

// ─── Prayer repo ─────────────────────────────────────────────────────────────

pub struct PrayerRepo;

impl PrayerRepo {
    pub fn get(conn: &Connection, user: &str, date: NaiveDate) -> rusqlite::Result<Option<PrayerRecord>> {
        conn.query_row(
            "SELECT fajr, dhuhr, asr, maghrib, isha FROM prayers WHERE user_id = ?1 AND date = ?2",
            params![user, day_key(date)],
            |row| {
                Ok(PrayerRecord {
                    fajr: row.get::<_, i32>(0)? != 0,
                    dhuhr: row.get::<_, i32>(1)? != 0,
                    asr: row.get::<_, i32>(2)? != 0,
                    maghrib: row.get::<_, i32>(3)? != 0,
                    isha: row.get::<_, i32>(4)? != 0,
                })
            },
        )
        .optional()
    }

    /// Upsert a single prayer column, leaving the other four as they were.
    pub fn set(
        conn: &Connection,
        user: &str,
        date: NaiveDate,
        prayer: PrayerType,
        done: bool,
    ) -> rusqlite::Result<()> {
        // column names come from a closed enum
        let column = prayer.as_str();
        let sql = format!(
            "INSERT INTO prayers (user_id, date, {column}) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, date) DO UPDATE SET {column} = ?3"
        );
        conn.execute(&sql, params![user, day_key(date), done as i32])?;
        Ok(())
    }
}

// ─── Quran repo ──────────────────────────────────────────────────────────────

pub struct QuranRepo;

impl QuranRepo {
    pub fn get_for_date(conn: &Connection, user: &str, date: NaiveDate) -> rusqlite::Result<Vec<QuranRecord>> {
        let mut stmt = conn.prepare(
            "SELECT surah_name, pages_read, current_ayah, target_pages, completed
             FROM quran_readings WHERE user_id = ?1 AND date = ?2
             ORDER BY CASE surah_name
               WHEN 'baqarah' THEN 1 WHEN 'mulk' THEN 2 WHEN 'kahf' THEN 3 END",
        )?;

        let rows = stmt.query_map(params![user, day_key(date)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, i32>(3)?,
                row.get::<_, i32>(4)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (surah, pages_read, current_ayah, target_pages, completed) = r?;
            result.push(QuranRecord {
                date,
                surah: Surah::from_str(&surah).map_err(bad_column)?,
                pages_read,
                current_ayah,
                target_pages,
                completed: completed != 0,
            });
        }
        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn upsert(
        conn: &Connection,
        user: &str,
        date: NaiveDate,
        surah: Surah,
        pages_read: i32,
        current_ayah: i32,
        target_pages: i32,
        completed: bool,
    ) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO quran_readings
               (user_id, date, surah_name, pages_read, current_ayah, target_pages, completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id, date, surah_name) DO UPDATE SET
               pages_read = ?4, current_ayah = ?5, target_pages = ?6, completed = ?7,
               updated_at = datetime('now')",
            params![
                user,
                day_key(date),
                surah.as_str(),
                pages_read,
                current_ayah,
                target_pages,
                completed as i32
            ],
        )?;
        Ok(())
    }
}

// ─── Athkar repo ─────────────────────────────────────────────────────────────

pub struct AthkarRepo;

impl AthkarRepo {
    pub fn get_for_date(conn: &Connection, user: &str, date: NaiveDate) -> rusqlite::Result<Vec<AthkarRecord>> {
        let mut stmt = conn.prepare(
            "SELECT type, completed FROM athkar WHERE user_id = ?1 AND date = ?2 ORDER BY type DESC",
        )?;

        let rows = stmt.query_map(params![user, day_key(date)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (athkar_type, completed) = r?;
            result.push(AthkarRecord {
                date,
                athkar_type: AthkarType::from_str(&athkar_type).map_err(bad_column)?,
                completed: completed != 0,
            });
        }
        Ok(result)
    }

    pub fn upsert(
        conn: &Connection,
        user: &str,
        date: NaiveDate,
        athkar_type: AthkarType,
        completed: bool,
    ) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO athkar (user_id, date, type, completed) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, date, type) DO UPDATE SET completed = ?4",
            params![user, day_key(date), athkar_type.as_str(), completed as i32],
        )?;
        Ok(())
    }
}

// ─── Stats repo ──────────────────────────────────────────────────────────────

pub struct StatsRepo;

impl StatsRepo {
    /// One entry per day in `start..=end`, zero-filled where nothing was
    /// recorded.
    pub fn weekly(conn: &Connection, user: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<WeeklyDay>> {
        let mut days: Vec<WeeklyDay> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| WeeklyDay {
                date,
                prayers_done: 0,
                athkar_done: 0,
                quran_pages: 0,
            })
            .collect();

        let (from, to) = (day_key(start), day_key(end));

        let mut stmt = conn.prepare(
            "SELECT date, fajr + dhuhr + asr + maghrib + isha
             FROM prayers WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
        )?;
        let prayers = stmt
            .query_map(params![user, from, to], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i32>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (date, done) in prayers {
            if let Some(day) = find_day(&mut days, &date) {
                day.prayers_done = done as u8;
            }
        }

        let mut stmt = conn.prepare(
            "SELECT date, SUM(completed) FROM athkar
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 GROUP BY date",
        )?;
        let athkar = stmt
            .query_map(params![user, from, to], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (date, done) in athkar {
            if let Some(day) = find_day(&mut days, &date) {
                day.athkar_done = done as u8;
            }
        }

        let mut stmt = conn.prepare(
            "SELECT date, SUM(pages_read) FROM quran_readings
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3 GROUP BY date",
        )?;
        let pages = stmt
            .query_map(params![user, from, to], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (date, total) in pages {
            if let Some(day) = find_day(&mut days, &date) {
                day.quran_pages = total;
            }
        }

        Ok(days)
    }
}

fn find_day<'a>(days: &'a mut [WeeklyDay], key: &str) -> Option<&'a mut WeeklyDay> {
    let date = NaiveDate::parse_from_str(key, DATE_FORMAT).ok()?;
    days.iter_mut().find(|d| d.date == date)
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn prayer_upsert_touches_one_column() {
        let conn = conn();
        assert_eq!(PrayerRepo::get(&conn, "u1", day(1)).unwrap(), None);

        PrayerRepo::set(&conn, "u1", day(1), PrayerType::Fajr, true).unwrap();
        PrayerRepo::set(&conn, "u1", day(1), PrayerType::Isha, true).unwrap();
        PrayerRepo::set(&conn, "u1", day(1), PrayerType::Fajr, false).unwrap();

        let record = PrayerRepo::get(&conn, "u1", day(1)).unwrap().unwrap();
        assert!(!record.fajr);
        assert!(record.isha);
        assert_eq!(record.done_count(), 1);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM prayers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn quran_rows_are_keyed_by_surah() {
        let conn = conn();
        QuranRepo::upsert(&conn, "u1", day(1), Surah::Mulk, 100, 0, 1, true).unwrap();
        QuranRepo::upsert(&conn, "u1", day(1), Surah::Baqarah, 2, 0, 4, false).unwrap();
        QuranRepo::upsert(&conn, "u1", day(1), Surah::Baqarah, 5, 0, 4, true).unwrap();

        let records = QuranRepo::get_for_date(&conn, "u1", day(1)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].surah, Surah::Baqarah);
        assert_eq!(records[0].pages_read, 5);
        assert!(records[0].completed);
        assert_eq!(records[1].surah, Surah::Mulk);
    }

    #[test]
    fn athkar_morning_sorts_first() {
        let conn = conn();
        AthkarRepo::upsert(&conn, "u1", day(1), AthkarType::Evening, true).unwrap();
        AthkarRepo::upsert(&conn, "u1", day(1), AthkarType::Morning, false).unwrap();
        let records = AthkarRepo::get_for_date(&conn, "u1", day(1)).unwrap();
        assert_eq!(records[0].athkar_type, AthkarType::Morning);
        assert!(records[1].completed);
    }

    #[test]
    fn weekly_fills_gaps_with_zeroes() {
        let conn = conn();
        PrayerRepo::set(&conn, "u1", day(2), PrayerType::Fajr, true).unwrap();
        PrayerRepo::set(&conn, "u1", day(2), PrayerType::Asr, true).unwrap();
        AthkarRepo::upsert(&conn, "u1", day(3), AthkarType::Morning, true).unwrap();
        QuranRepo::upsert(&conn, "u1", day(3), Surah::Baqarah, 4, 0, 4, true).unwrap();
        QuranRepo::upsert(&conn, "u1", day(3), Surah::Mulk, 100, 0, 1, true).unwrap();
        PrayerRepo::set(&conn, "u2", day(2), PrayerType::Isha, true).unwrap();

        let week = StatsRepo::weekly(&conn, "u1", day(1), day(7)).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].prayers_done, 0);
        assert_eq!(week[1].prayers_done, 2);
        assert_eq!(week[2].athkar_done, 1);
        assert_eq!(week[2].quran_pages, 104);
    }

    #[test]
    fn cache_round_trip() {
        let conn = conn();
        assert!(CacheRepo::get_times_for_date(&conn, day(1)).unwrap().is_none());
        CacheRepo::store_times(&conn, day(1), &PrayerTimes::fallback()).unwrap();
        assert_eq!(
            CacheRepo::get_times_for_date(&conn, day(1)).unwrap(),
            Some(PrayerTimes::fallback())
        );
        CacheRepo::clear_all(&conn).unwrap();
        assert!(CacheRepo::get_times_for_date(&conn, day(1)).unwrap().is_none());
    }

    #[test]
    fn meta_overwrites() {
        let conn = conn();
        MetaRepo::set(&conn, "last_opened", "2024-03-01").unwrap();
        MetaRepo::set(&conn, "last_opened", "2024-03-02").unwrap();
        assert_eq!(MetaRepo::get(&conn, "last_opened").unwrap().as_deref(), Some("2024-03-02"));
    }
}
