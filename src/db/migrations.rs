use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS habits (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description  TEXT,
            created_on   TEXT NOT NULL,
            archived     INTEGER DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS habit_entries (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id   INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            completed  INTEGER NOT NULL DEFAULT 0,
            note       TEXT,
            UNIQUE(habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            date        TEXT NOT NULL,
            mood        INTEGER CHECK(mood IS NULL OR mood BETWEEN 1 AND 5),
            body        TEXT NOT NULL,
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS todos (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            title         TEXT NOT NULL,
            priority      TEXT NOT NULL DEFAULT 'normal'
                          CHECK(priority IN ('low','normal','high')),
            created_on    TEXT NOT NULL,
            completed     INTEGER DEFAULT 0,
            completed_on  TEXT
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_habit_entries_date ON habit_entries(date);
        CREATE INDEX IF NOT EXISTS idx_journal_date ON journal_entries(date);
    ")?;

    log::debug!("schema ready");
    Ok(())
}
