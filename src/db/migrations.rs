use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS masjids (
            id         TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            address    TEXT,
            city       TEXT,
            contact    TEXT,
            latitude   REAL,
            longitude  REAL,
            created_at TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS masjid_times (
            masjid_id  TEXT NOT NULL REFERENCES masjids(id) ON DELETE CASCADE,
            field      TEXT NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (masjid_id, field)
        );

        CREATE TABLE IF NOT EXISTS quran_log (
            date            TEXT PRIMARY KEY,
            ayahs_read      INTEGER NOT NULL DEFAULT 0,
            ayahs_listened  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS quran_rewards (
            id        INTEGER PRIMARY KEY CHECK(id = 1),
            earned    INTEGER NOT NULL DEFAULT 0,
            redeemed  INTEGER NOT NULL DEFAULT 0
        );

        INSERT OR IGNORE INTO quran_rewards (id, earned, redeemed) VALUES (1, 0, 0);
    ")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM quran_rewards", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
