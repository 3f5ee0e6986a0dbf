use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS prayers (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    TEXT NOT NULL,
            date       TEXT NOT NULL,
            fajr       INTEGER NOT NULL DEFAULT 0,
            dhuhr      INTEGER NOT NULL DEFAULT 0,
            asr        INTEGER NOT NULL DEFAULT 0,
            maghrib    INTEGER NOT NULL DEFAULT 0,
            isha       INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            UNIQUE(user_id, date)
        );

        CREATE TABLE IF NOT EXISTS quran_readings (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      TEXT NOT NULL,
            date         TEXT NOT NULL,
            surah_name   TEXT NOT NULL CHECK(surah_name IN ('baqarah','mulk','kahf')),
            pages_read   INTEGER NOT NULL DEFAULT 0,
            current_ayah INTEGER NOT NULL DEFAULT 0,
            target_pages INTEGER NOT NULL DEFAULT 1,
            completed    INTEGER NOT NULL DEFAULT 0,
            updated_at   TEXT DEFAULT (datetime('now')),
            UNIQUE(user_id, date, surah_name)
        );

        CREATE TABLE IF NOT EXISTS athkar (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id   TEXT NOT NULL,
            date      TEXT NOT NULL,
            type      TEXT NOT NULL CHECK(type IN ('morning','evening')),
            completed INTEGER NOT NULL DEFAULT 0,
            UNIQUE(user_id, date, type)
        );

        CREATE TABLE IF NOT EXISTS prayer_times_cache (
            date     TEXT PRIMARY KEY,
            fajr     TEXT,
            dhuhr    TEXT,
            asr      TEXT,
            maghrib  TEXT,
            isha     TEXT
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_rerunnable() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 5);
    }
}
