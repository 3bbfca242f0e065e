use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

use crate::db::{StoreError, StoreResult};
use crate::models::journal::{MOOD_MAX, MOOD_MIN};
use crate::models::{DatedRecord, Habit, HabitEntry, JournalEntry, Priority, Todo};

// ─── Habits ──────────────────────────────────────────────────────────────────

pub struct HabitRepo;

impl HabitRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_on: row.get(3)?,
            archived: row.get::<_, i32>(4)? != 0,
        })
    }

    pub fn insert(
        conn: &Connection,
        name: &str,
        description: Option<&str>,
        created_on: &str,
    ) -> StoreResult<i64> {
        if Self::find_by_name(conn, name)?.is_some() {
            return Err(StoreError::DuplicateHabit(name.to_string()));
        }
        conn.execute(
            "INSERT INTO habits (name, description, created_on, archived) VALUES (?1, ?2, ?3, 0)",
            params![name, description, created_on],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_active(conn: &Connection) -> StoreResult<Vec<Habit>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_on, archived
             FROM habits WHERE archived = 0 ORDER BY id",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Name lookup ignores case.
    pub fn find_by_name(conn: &Connection, name: &str) -> StoreResult<Option<Habit>> {
        Ok(conn
            .query_row(
                "SELECT id, name, description, created_on, archived FROM habits WHERE name = ?1",
                params![name.trim()],
                Self::from_row,
            )
            .optional()?)
    }

    pub fn by_id(conn: &Connection, id: i64) -> StoreResult<Option<Habit>> {
        Ok(conn
            .query_row(
                "SELECT id, name, description, created_on, archived FROM habits WHERE id = ?1",
                params![id],
                Self::from_row,
            )
            .optional()?)
    }

    pub fn require(conn: &Connection, name: &str) -> StoreResult<Habit> {
        Self::find_by_name(conn, name)?.ok_or_else(|| StoreError::HabitNotFound(name.to_string()))
    }

    pub fn set_archived(conn: &Connection, id: i64, archived: bool) -> StoreResult<()> {
        conn.execute(
            "UPDATE habits SET archived = ?1 WHERE id = ?2",
            params![archived as i32, id],
        )?;
        Ok(())
    }
}

// ─── Habit entries ───────────────────────────────────────────────────────────

pub struct EntryRepo;

impl EntryRepo {
    /// One row per habit and day; a second write for the same day replaces the first.
    pub fn upsert(
        conn: &Connection,
        habit_id: i64,
        date: &str,
        completed: bool,
        note: Option<&str>,
    ) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO habit_entries (habit_id, date, completed, note)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(habit_id, date) DO UPDATE SET completed = ?3, note = COALESCE(?4, note)",
            params![habit_id, date, completed as i32, note],
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, habit_id: i64, date: &str) -> StoreResult<Option<HabitEntry>> {
        Ok(conn
            .query_row(
                "SELECT id, habit_id, date, completed, note
                 FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date],
                |row| {
                    Ok(HabitEntry {
                        id: Some(row.get(0)?),
                        habit_id: row.get(1)?,
                        date: row.get(2)?,
                        completed: row.get::<_, i32>(3)? != 0,
                        note: row.get(4)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn entries_for(conn: &Connection, habit_id: i64) -> StoreResult<Vec<HabitEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, completed, note
             FROM habit_entries WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| {
            Ok(HabitEntry {
                id: Some(row.get(0)?),
                habit_id: row.get(1)?,
                date: row.get(2)?,
                completed: row.get::<_, i32>(3)? != 0,
                note: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn records_for(conn: &Connection, habit_id: i64) -> StoreResult<Vec<DatedRecord>> {
        let mut stmt = conn.prepare(
            "SELECT date, completed FROM habit_entries WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| {
            Ok(DatedRecord::new(
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)? != 0,
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub struct JournalRepo;

impl JournalRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
        Ok(JournalEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            mood: row.get::<_, Option<i64>>(2)?.map(|m| m as u8),
            body: row.get(3)?,
        })
    }

    pub fn insert(
        conn: &Connection,
        date: &str,
        mood: Option<u8>,
        body: &str,
    ) -> StoreResult<i64> {
        if let Some(m) = mood {
            if !(MOOD_MIN..=MOOD_MAX).contains(&m) {
                return Err(StoreError::InvalidMood(m));
            }
        }
        conn.execute(
            "INSERT INTO journal_entries (date, mood, body) VALUES (?1, ?2, ?3)",
            params![date, mood, body],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn recent(conn: &Connection, limit: usize) -> StoreResult<Vec<JournalEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, mood, body FROM journal_entries
             ORDER BY date DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn between(conn: &Connection, start: &str, end: &str) -> StoreResult<Vec<JournalEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, date, mood, body FROM journal_entries
             WHERE date >= ?1 AND date <= ?2 ORDER BY date, id",
        )?;
        let rows = stmt.query_map(params![start, end], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every entry counts as a completed day for the journal streak.
    pub fn records(conn: &Connection) -> StoreResult<Vec<DatedRecord>> {
        let mut stmt = conn.prepare("SELECT date FROM journal_entries ORDER BY date")?;
        let rows = stmt.query_map([], |row| Ok(DatedRecord::new(row.get::<_, String>(0)?, true)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn exists_on(conn: &Connection, date: &str) -> StoreResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM journal_entries WHERE date = ?1",
            params![date],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

// ─── Todos ───────────────────────────────────────────────────────────────────

pub struct TodoRepo;

impl TodoRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
        let priority: String = row.get(2)?;
        Ok(Todo {
            id: row.get(0)?,
            title: row.get(1)?,
            priority: Priority::from_str(&priority)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?,
            created_on: row.get(3)?,
            completed: row.get::<_, i32>(4)? != 0,
            completed_on: row.get(5)?,
        })
    }

    pub fn insert(
        conn: &Connection,
        title: &str,
        priority: Priority,
        created_on: &str,
    ) -> StoreResult<i64> {
        conn.execute(
            "INSERT INTO todos (title, priority, created_on, completed) VALUES (?1, ?2, ?3, 0)",
            params![title, priority.as_str(), created_on],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Open todos first, highest priority first within each group.
    pub fn list(conn: &Connection, include_done: bool) -> StoreResult<Vec<Todo>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, priority, created_on, completed, completed_on
             FROM todos WHERE ?1 OR completed = 0
             ORDER BY completed,
                      CASE priority WHEN 'high' THEN 0 WHEN 'normal' THEN 1 ELSE 2 END,
                      id",
        )?;
        let rows = stmt.query_map(params![include_done], Self::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn set_completed(
        conn: &Connection,
        id: i64,
        completed_on: Option<&str>,
    ) -> StoreResult<()> {
        let changed = conn.execute(
            "UPDATE todos SET completed = ?1, completed_on = ?2 WHERE id = ?3",
            params![completed_on.is_some() as i32, completed_on, id],
        )?;
        if changed == 0 {
            return Err(StoreError::TodoNotFound(id));
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: i64) -> StoreResult<()> {
        let changed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::TodoNotFound(id));
        }
        Ok(())
    }

    /// One completed record per finished todo, dated on the day it was finished.
    pub fn completion_records(conn: &Connection) -> StoreResult<Vec<DatedRecord>> {
        let mut stmt = conn.prepare(
            "SELECT completed_on FROM todos WHERE completed = 1 AND completed_on IS NOT NULL",
        )?;
        let rows = stmt.query_map([], |row| Ok(DatedRecord::new(row.get::<_, String>(0)?, true)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// (open, done)
    pub fn counts(conn: &Connection) -> StoreResult<(u32, u32)> {
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN completed = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0)
             FROM todos",
            [],
            |row| Ok((row.get::<_, i64>(0)? as u32, row.get::<_, i64>(1)? as u32)),
        )?)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> StoreResult<Option<String>> {
        Ok(conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
