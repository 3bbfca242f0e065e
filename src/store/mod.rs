//! The application's single handle on its data.
//!
//! `Store` is built once in `main` and lent to whoever needs it. Every mutation
//! ends with a [`Change`] sent to the registered subscribers, which typically
//! re-read the affected records and re-run the calculators in [`crate::stats`].

pub mod summary;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use std::path::Path;

use crate::db::migrations::run_migrations;
use crate::db::repository::{EntryRepo, HabitRepo, JournalRepo, MetaRepo, TodoRepo};
use crate::db::{StoreError, StoreResult};
use crate::models::{DatedRecord, Habit, HabitEntry, JournalEntry, Priority, Todo};
use crate::models::journal::average_mood;
use crate::stats::{self, compute_stats, compute_streaks};
use crate::utils::dates::{WeekStart, format_day, parse_day, week_bounds};

pub use summary::{HabitSummary, ImportSummary, JournalSummary, TodoSummary};

/// What a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Habit(i64),
    Journal,
    Todos,
}

pub type Subscriber = Box<dyn Fn(&Change, &Store)>;

pub struct Store {
    conn: Connection,
    week_start: WeekStart,
    subscribers: Vec<Subscriber>,
}

impl Store {
    pub fn open(path: &Path, week_start: WeekStart) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::new(conn, week_start)
    }

    #[cfg(test)]
    pub fn in_memory(week_start: WeekStart) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, week_start)
    }

    fn new(conn: Connection, week_start: WeekStart) -> Result<Self> {
        run_migrations(&conn).context("Running migrations")?;
        Ok(Self {
            conn,
            week_start,
            subscribers: Vec::new(),
        })
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Change, &Store) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&self, change: Change) {
        log::debug!("notifying {} subscriber(s) of {:?}", self.subscribers.len(), change);
        for subscriber in &self.subscribers {
            subscriber(&change, self);
        }
    }

    // ─── Habits ──────────────────────────────────────────────────────────────

    pub fn add_habit(
        &self,
        name: &str,
        description: Option<&str>,
        today: NaiveDate,
    ) -> StoreResult<Habit> {
        let name = name.trim();
        let id = HabitRepo::insert(&self.conn, name, description, &format_day(today))?;
        log::info!("added habit {} ({})", name, id);
        self.notify(Change::Habit(id));
        HabitRepo::require(&self.conn, name)
    }

    pub fn habit(&self, name: &str) -> StoreResult<Habit> {
        HabitRepo::require(&self.conn, name)
    }

    pub fn habit_by_id(&self, id: i64) -> StoreResult<Option<Habit>> {
        HabitRepo::by_id(&self.conn, id)
    }

    pub fn active_habits(&self) -> StoreResult<Vec<Habit>> {
        HabitRepo::list_active(&self.conn)
    }

    /// Record a habit as done (or not) on `date`, a `YYYY-MM-DD`-style string.
    /// Returns the habit and the calendar day the entry was stored under.
    pub fn mark_habit(
        &self,
        name: &str,
        date: &str,
        completed: bool,
        note: Option<&str>,
    ) -> StoreResult<(Habit, NaiveDate)> {
        let habit = HabitRepo::require(&self.conn, name)?;
        let day = parse_day(date).ok_or_else(|| StoreError::InvalidDate(date.to_string()))?;
        EntryRepo::upsert(&self.conn, habit.id, &format_day(day), completed, note)?;
        log::debug!("habit {} on {} -> {}", habit.name, day, completed);
        self.notify(Change::Habit(habit.id));
        Ok((habit, day))
    }

    pub fn archive_habit(&self, name: &str) -> StoreResult<Habit> {
        let habit = HabitRepo::require(&self.conn, name)?;
        HabitRepo::set_archived(&self.conn, habit.id, true)?;
        self.notify(Change::Habit(habit.id));
        Ok(habit)
    }

    /// Write external records as entries for `name`. Same-day records collapse to
    /// one entry that is completed if any of them was; undated records are skipped.
    pub fn import_records(&self, name: &str, records: &[DatedRecord]) -> StoreResult<ImportSummary> {
        let habit = HabitRepo::require(&self.conn, name)?;
        let skipped = records.iter().filter(|r| r.day().is_none()).count() as u32;
        if skipped > 0 {
            log::warn!("{} record(s) with unreadable dates skipped", skipped);
        }

        let by_day = stats::completed_by_day(records);
        let tx = self.conn.unchecked_transaction()?;
        for (day, completed) in &by_day {
            EntryRepo::upsert(&tx, habit.id, &format_day(*day), *completed, None)?;
        }
        tx.commit()?;

        self.notify(Change::Habit(habit.id));
        Ok(ImportSummary {
            days: by_day.len() as u32,
            skipped,
        })
    }

    pub fn habit_records(&self, habit_id: i64) -> StoreResult<Vec<DatedRecord>> {
        EntryRepo::records_for(&self.conn, habit_id)
    }

    pub fn habit_entries(&self, habit_id: i64) -> StoreResult<Vec<HabitEntry>> {
        EntryRepo::entries_for(&self.conn, habit_id)
    }

    pub fn habit_summary(&self, habit: &Habit, today: NaiveDate) -> StoreResult<HabitSummary> {
        let records = self.habit_records(habit.id)?;
        let done_today = EntryRepo::get(&self.conn, habit.id, &format_day(today))?
            .map(|e| e.completed)
            .unwrap_or(false);

        Ok(HabitSummary {
            habit: habit.clone(),
            streak: compute_streaks(&records, today),
            stats: compute_stats(&records, today, self.week_start),
            done_today,
            week: stats::daily_grid(&records, today, 7),
        })
    }

    // ─── Journal ─────────────────────────────────────────────────────────────

    pub fn write_journal(
        &self,
        date: &str,
        mood: Option<u8>,
        body: &str,
    ) -> StoreResult<(i64, NaiveDate)> {
        let day = parse_day(date).ok_or_else(|| StoreError::InvalidDate(date.to_string()))?;
        let id = JournalRepo::insert(&self.conn, &format_day(day), mood, body)?;
        self.notify(Change::Journal);
        Ok((id, day))
    }

    pub fn recent_journal(&self, limit: usize) -> StoreResult<Vec<JournalEntry>> {
        JournalRepo::recent(&self.conn, limit)
    }

    pub fn journal_summary(&self, today: NaiveDate) -> StoreResult<JournalSummary> {
        let records = JournalRepo::records(&self.conn)?;

        let (week_first, week_last) = week_bounds(today, self.week_start);
        let week = JournalRepo::between(&self.conn, &format_day(week_first), &format_day(week_last))?;

        let month_first = today.with_day(1).unwrap_or(today);
        let month = JournalRepo::between(&self.conn, &format_day(month_first), &format_day(today))?;

        Ok(JournalSummary {
            streak: compute_streaks(&records, today),
            stats: compute_stats(&records, today, self.week_start),
            written_today: JournalRepo::exists_on(&self.conn, &format_day(today))?,
            average_mood_week: average_mood(&week),
            average_mood_month: average_mood(&month),
        })
    }

    // ─── Todos ───────────────────────────────────────────────────────────────

    pub fn add_todo(&self, title: &str, priority: Priority, today: NaiveDate) -> StoreResult<i64> {
        let id = TodoRepo::insert(&self.conn, title.trim(), priority, &format_day(today))?;
        self.notify(Change::Todos);
        Ok(id)
    }

    pub fn todos(&self, include_done: bool) -> StoreResult<Vec<Todo>> {
        TodoRepo::list(&self.conn, include_done)
    }

    pub fn complete_todo(&self, id: i64, on: NaiveDate) -> StoreResult<()> {
        TodoRepo::set_completed(&self.conn, id, Some(&format_day(on)))?;
        self.notify(Change::Todos);
        Ok(())
    }

    pub fn reopen_todo(&self, id: i64) -> StoreResult<()> {
        TodoRepo::set_completed(&self.conn, id, None)?;
        self.notify(Change::Todos);
        Ok(())
    }

    pub fn remove_todo(&self, id: i64) -> StoreResult<()> {
        TodoRepo::delete(&self.conn, id)?;
        self.notify(Change::Todos);
        Ok(())
    }

    pub fn todo_summary(&self, today: NaiveDate) -> StoreResult<TodoSummary> {
        let (open, done) = TodoRepo::counts(&self.conn)?;
        let records = TodoRepo::completion_records(&self.conn)?;
        Ok(TodoSummary {
            open,
            done,
            stats: compute_stats(&records, today, self.week_start),
        })
    }

    // ─── Meta ────────────────────────────────────────────────────────────────

    pub fn meta(&self, key: &str) -> StoreResult<Option<String>> {
        MetaRepo::get(&self.conn, key)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> StoreResult<()> {
        MetaRepo::set(&self.conn, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn store() -> Store {
        Store::in_memory(WeekStart::Monday).unwrap()
    }

    #[test]
    fn test_subscribers_see_each_mutation() {
        let mut store = store();
        let seen: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |change, _| sink.borrow_mut().push(change.clone()));

        let habit = store.add_habit("Run", None, today()).unwrap();
        store.mark_habit("run", "2024-06-15", true, None).unwrap();
        store.write_journal("2024-06-15", Some(3), "ok").unwrap();
        let todo = store.add_todo("call mom", Priority::Normal, today()).unwrap();
        store.complete_todo(todo, today()).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                Change::Habit(habit.id),
                Change::Habit(habit.id),
                Change::Journal,
                Change::Todos,
                Change::Todos,
            ]
        );
    }

    #[test]
    fn test_subscriber_recomputes_streak() {
        let mut store = store();
        let current = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&current);
        store.subscribe(move |change, store| {
            if let Change::Habit(id) = change {
                let records = store.habit_records(*id).unwrap();
                *sink.borrow_mut() = compute_streaks(&records, today()).current;
            }
        });

        store.add_habit("Read", None, today()).unwrap();
        for back in 0..3 {
            let day = format_day(today() - Duration::days(back));
            store.mark_habit("Read", &day, true, None).unwrap();
        }
        assert_eq!(*current.borrow(), 3);

        store.mark_habit("Read", "2024-06-14", false, None).unwrap();
        assert_eq!(*current.borrow(), 1);
    }

    #[test]
    fn test_failed_mutation_does_not_notify() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&calls);
        store.subscribe(move |_, _| *sink.borrow_mut() += 1);

        assert!(matches!(
            store.mark_habit("missing", "2024-06-15", true, None),
            Err(StoreError::HabitNotFound(_))
        ));
        store.add_habit("Run", None, today()).unwrap();
        assert!(matches!(
            store.mark_habit("Run", "someday", true, None),
            Err(StoreError::InvalidDate(_))
        ));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_import_collapses_days_and_skips_bad_dates() {
        let store = store();
        let habit = store.add_habit("Stretch", None, today()).unwrap();
        let records = vec![
            DatedRecord::new("2024-06-13", false),
            DatedRecord::new("2024-06-13T20:00:00", true),
            DatedRecord::new("2024-06-14", true),
            DatedRecord::new("whenever", true),
        ];

        let summary = store.import_records("stretch", &records).unwrap();
        assert_eq!(summary, ImportSummary { days: 2, skipped: 1 });

        let hs = store.habit_summary(&habit, today()).unwrap();
        assert_eq!(hs.streak.current, 2);
        assert!(!hs.done_today);
        assert_eq!(hs.week.len(), 7);
    }

    #[test]
    fn test_import_json_with_null_date_keeps_going() {
        let store = store();
        store.add_habit("Floss", None, today()).unwrap();
        let records: Vec<DatedRecord> = serde_json::from_str(
            r#"[{"date": null, "completed": true}, {"date": "2024-06-15", "completed": true}]"#,
        )
        .unwrap();

        let summary = store.import_records("Floss", &records).unwrap();
        assert_eq!(summary, ImportSummary { days: 1, skipped: 1 });
    }

    #[test]
    fn test_mark_and_write_return_stored_day() {
        let store = store();
        store.add_habit("Run", None, today()).unwrap();

        let (_, day) = store.mark_habit("Run", "2024-06-15T07:30:00", true, None).unwrap();
        assert_eq!(day, today());
        let (_, day) = store.write_journal("2024-06-14 21:00:00", None, "late").unwrap();
        assert_eq!(format_day(day), "2024-06-14");
    }

    #[test]
    fn test_journal_summary() {
        let store = store();
        store.write_journal("2024-06-14", Some(2), "meh").unwrap();
        store.write_journal("2024-06-15", Some(4), "better").unwrap();
        store.write_journal("2024-06-15", None, "evening note").unwrap();

        let js = store.journal_summary(today()).unwrap();
        assert!(js.written_today);
        assert_eq!(js.streak.current, 2);
        assert_eq!(js.stats.total, 3);
        assert_eq!(js.average_mood_week, Some(3.0));
        assert_eq!(js.average_mood_month, Some(3.0));
    }

    #[test]
    fn test_todo_summary() {
        let store = store();
        let a = store.add_todo("a", Priority::High, today()).unwrap();
        store.add_todo("b", Priority::Low, today()).unwrap();
        store.complete_todo(a, today()).unwrap();

        let ts = store.todo_summary(today()).unwrap();
        assert_eq!((ts.open, ts.done), (1, 1));
        assert_eq!(ts.stats.this_week, 1);
        assert!((ts.done_ratio() - 0.5).abs() < 1e-9);

        store.reopen_todo(a).unwrap();
        assert_eq!(store.todo_summary(today()).unwrap().done, 0);
        store.remove_todo(a).unwrap();
        assert_eq!(store.todos(true).unwrap().len(), 1);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streakbook.db");
        {
            let store = Store::open(&path, WeekStart::Sunday).unwrap();
            store.add_habit("Walk", None, today()).unwrap();
        }
        let store = Store::open(&path, WeekStart::Sunday).unwrap();
        assert_eq!(store.active_habits().unwrap().len(), 1);
        assert_eq!(store.week_start(), WeekStart::Sunday);
    }
}
