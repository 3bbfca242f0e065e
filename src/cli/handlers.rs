use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use crate::cli::args::{ConfigCommands, HabitCommands, JournalCommands, TodoCommands};
use crate::config::settings::DisplayConfig;
use crate::config::AppConfig;
use crate::models::journal::mood_label;
use crate::models::{DatedRecord, DayCell, HabitEntry, Priority};
use crate::store::{Change, HabitSummary, JournalSummary, Store, TodoSummary};
use crate::utils::dates::{WeekStart, format_day};
use crate::utils::format::{days_label, pad_display, percent, progress_bar, ratio_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($ui:expr, $color:expr, $($arg:tt)*) => {{
        if $ui.color {
            print!("{}", $color);
        }
        print!($($arg)*);
        if $ui.color {
            println!("\x1b[0m");
        } else {
            println!();
        }
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn paint(ui: &DisplayConfig, color: &str, text: &str) -> String {
    if ui.color {
        format!("{}{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}

// ─── Change reporting ────────────────────────────────────────────────────────

/// Buffers a refreshed summary line per store change so it can be printed after
/// the command's own output.
#[derive(Clone, Default)]
pub struct ChangeReport {
    lines: Rc<RefCell<Vec<String>>>,
}

impl ChangeReport {
    pub fn subscriber(self, ui: DisplayConfig, today: NaiveDate) -> impl Fn(&Change, &Store) + 'static {
        let lines = self.lines;
        move |change, store| match describe_change(&ui, today, change, store) {
            Ok(Some(line)) => lines.borrow_mut().push(line),
            Ok(None) => {}
            Err(e) => log::warn!("could not refresh stats after {:?}: {:#}", change, e),
        }
    }

    pub fn flush(&self) {
        for line in self.lines.borrow_mut().drain(..) {
            println!("{}", line);
        }
    }
}

fn describe_change(
    ui: &DisplayConfig,
    today: NaiveDate,
    change: &Change,
    store: &Store,
) -> Result<Option<String>> {
    let text = match change {
        Change::Habit(id) => {
            let Some(habit) = store.habit_by_id(*id)? else {
                return Ok(None);
            };
            if habit.archived {
                return Ok(None);
            }
            let summary = store.habit_summary(&habit, today)?;
            format!(
                "    streak {}  ·  best {}",
                days_label(summary.streak.current),
                days_label(summary.streak.best)
            )
        }
        Change::Journal => {
            let summary = store.journal_summary(today)?;
            format!(
                "    journal streak {}  ·  {} entries this week",
                days_label(summary.streak.current),
                summary.stats.this_week
            )
        }
        Change::Todos => {
            let summary = store.todo_summary(today)?;
            format!(
                "    {} open  ·  {} done this week",
                summary.open, summary.stats.this_week
            )
        }
    };
    Ok(Some(paint(ui, DIM, &text)))
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

pub fn handle_dashboard(store: &Store, ui: &DisplayConfig, today: NaiveDate) -> Result<()> {
    let habits = store.active_habits()?;

    println!();
    println_colored!(ui, GOLD, "  streakbook — {}", today.format("%A, %d %B %Y"));
    println!();

    if store.meta("welcomed")?.is_none() {
        println_colored!(ui, DIM, "  Get started: streakbook habit add \"Read\"");
        println_colored!(ui, DIM, "               streakbook habit check \"Read\"");
        println!();
        store.set_meta("welcomed", "1")?;
    }

    if habits.is_empty() {
        println_colored!(ui, DIM, "  No habits yet");
    } else {
        let mut done = 0u32;
        for habit in &habits {
            let summary = store.habit_summary(habit, today)?;
            if summary.done_today {
                done += 1;
            }
            println!("{}", habit_line(&summary, ui));
        }
        println!();
        println_colored!(
            ui,
            BOLD,
            "  Today  {}  {}/{}",
            progress_bar(done, habits.len() as u32, ui.bar_width),
            done,
            habits.len()
        );
    }

    let journal = store.journal_summary(today)?;
    let todos = store.todo_summary(today)?;
    println!();
    if journal.written_today {
        println_colored!(ui, GREEN, "  ✓ Journal written today");
    } else {
        println_colored!(ui, AMBER, "  ○ No journal entry yet today");
    }
    println!("  Todos: {} open, {} done", todos.open, todos.done);
    println!();
    Ok(())
}

fn habit_line(summary: &HabitSummary, ui: &DisplayConfig) -> String {
    let mark = if summary.done_today {
        paint(ui, GREEN, "✓")
    } else {
        paint(ui, DIM, "○")
    };
    let streak = if summary.streak.is_active() {
        paint(ui, GREEN, &days_label(summary.streak.current))
    } else {
        paint(ui, DIM, &days_label(0))
    };
    format!(
        "  {} {}  {}  {}",
        mark,
        pad_display(&summary.habit.name, ui.name_width),
        week_strip(&summary.week, ui),
        streak
    )
}

fn week_strip(cells: &[DayCell], ui: &DisplayConfig) -> String {
    cells
        .iter()
        .map(|c| {
            if c.completed {
                paint(ui, GREEN, "●")
            } else {
                paint(ui, DIM, "·")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_habit(
    store: &Store,
    ui: &DisplayConfig,
    action: &HabitCommands,
    today: NaiveDate,
) -> Result<()> {
    match action {
        HabitCommands::Add { name, description } => {
            let habit = store.add_habit(name, description.as_deref(), today)?;
            println_colored!(ui, GREEN, "  ✓ Tracking {}", habit.name);
        }
        HabitCommands::List => {
            let habits = store.active_habits()?;
            println!();
            if habits.is_empty() {
                println_colored!(ui, DIM, "  No habits yet");
            }
            for habit in &habits {
                let summary = store.habit_summary(habit, today)?;
                println!(
                    "  {}  {:>8}  best {:>3}  {:>3}%  {}",
                    pad_display(&habit.name, ui.name_width),
                    days_label(summary.streak.current),
                    summary.streak.best,
                    percent(summary.stats.rate),
                    habit.description.as_deref().unwrap_or("")
                );
            }
            println!();
        }
        HabitCommands::Check { name, date, note } => {
            let date = date.clone().unwrap_or_else(|| format_day(today));
            let (habit, day) = store.mark_habit(name, &date, true, note.as_deref())?;
            println_colored!(ui, GREEN, "  ✓ {} done for {}", habit.name, format_day(day));
        }
        HabitCommands::Uncheck { name, date } => {
            let date = date.clone().unwrap_or_else(|| format_day(today));
            let (habit, day) = store.mark_habit(name, &date, false, None)?;
            println_colored!(ui, DIM, "  ○ {} unmarked for {}", habit.name, format_day(day));
        }
        HabitCommands::Archive { name } => {
            let habit = store.archive_habit(name)?;
            println_colored!(ui, AMBER, "  Archived {}", habit.name);
        }
        HabitCommands::Import { name, file } => {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Reading {:?}", file))?;
            let records: Vec<DatedRecord> =
                serde_json::from_str(&content).with_context(|| format!("Parsing {:?}", file))?;
            let summary = store.import_records(name, &records)?;
            println_colored!(ui, GREEN, "  ✓ Imported {} day(s) into {}", summary.days, name);
            if summary.skipped > 0 {
                println_colored!(ui, RED, "  ✗ Skipped {} record(s) with unreadable dates", summary.skipped);
            }
        }
    }
    Ok(())
}

// ─── Todos ───────────────────────────────────────────────────────────────────

pub fn handle_todo(
    store: &Store,
    ui: &DisplayConfig,
    action: &TodoCommands,
    today: NaiveDate,
) -> Result<()> {
    match action {
        TodoCommands::Add { title, priority } => {
            let priority = Priority::from_str(priority)?;
            let id = store.add_todo(title, priority, today)?;
            println_colored!(ui, GREEN, "  ✓ Added #{} {}", id, title);
        }
        TodoCommands::List { all } => {
            let todos = store.todos(*all)?;
            println!();
            if todos.is_empty() {
                println_colored!(ui, GREEN, "  ✓ Nothing to do");
            }
            for todo in &todos {
                if todo.completed {
                    println_colored!(
                        ui,
                        DIM,
                        "  #{:<4} ✓ {}  (done {})",
                        todo.id,
                        todo.title,
                        todo.completed_on.as_deref().unwrap_or("?")
                    );
                } else {
                    println!("  #{:<4} {} {}", todo.id, todo.priority.marker(), todo.title);
                }
            }
            println!();
        }
        TodoCommands::Done { id } => {
            store.complete_todo(*id, today)?;
            println_colored!(ui, GREEN, "  ✓ #{} done", id);
        }
        TodoCommands::Reopen { id } => {
            store.reopen_todo(*id)?;
            println_colored!(ui, AMBER, "  #{} reopened", id);
        }
        TodoCommands::Remove { id } => {
            store.remove_todo(*id)?;
            println_colored!(ui, DIM, "  #{} removed", id);
        }
    }
    Ok(())
}

// ─── Journal ─────────────────────────────────────────────────────────────────

pub fn handle_journal(
    store: &Store,
    ui: &DisplayConfig,
    action: &JournalCommands,
    today: NaiveDate,
) -> Result<()> {
    match action {
        JournalCommands::Write { text, mood, date } => {
            let date = date.clone().unwrap_or_else(|| format_day(today));
            let (_, day) = store.write_journal(&date, *mood, text)?;
            println_colored!(ui, GREEN, "  ✓ Journal entry saved for {}", format_day(day));
        }
        JournalCommands::List { limit } => {
            let entries = store.recent_journal(*limit)?;
            println!();
            if entries.is_empty() {
                println_colored!(ui, DIM, "  No entries yet");
            }
            for entry in &entries {
                let mood = entry.mood.map(mood_label).unwrap_or("");
                println_colored!(ui, BOLD, "  {}  {}", entry.date, mood);
                for line in entry.body.lines() {
                    println!("    {}", line);
                }
            }
            println!();
        }
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(
    store: &Store,
    ui: &DisplayConfig,
    habit: Option<&str>,
    week: bool,
    today: NaiveDate,
) -> Result<()> {
    let habits = match habit {
        Some(name) => vec![store.habit(name)?],
        None => store.active_habits()?,
    };

    println!();
    println_colored!(ui, GOLD, "  Statistics  (week starts {})", store.week_start().as_str());
    println!();

    for habit in &habits {
        let summary = store.habit_summary(habit, today)?;
        println_colored!(ui, BOLD, "  {}", habit.name);
        println!(
            "    Streak:  {} current  |  {} best",
            days_label(summary.streak.current),
            days_label(summary.streak.best)
        );
        println!(
            "    Done:    {} this week  |  {} this month  |  {} total",
            summary.stats.this_week, summary.stats.this_month, summary.stats.total
        );
        println!(
            "    Rate:    {}  {}%",
            ratio_bar(summary.stats.rate, ui.bar_width),
            percent(summary.stats.rate)
        );
        if week {
            println!("    Last 7:  {}", week_strip(&summary.week, ui));
        }
        println!();
    }

    if habit.is_none() {
        let journal = store.journal_summary(today)?;
        print_journal_stats(ui, &journal);
        let todos = store.todo_summary(today)?;
        print_todo_stats(ui, &todos);
    }
    Ok(())
}

fn print_journal_stats(ui: &DisplayConfig, journal: &JournalSummary) {
    println_colored!(ui, BOLD, "  Journal");
    println!(
        "    Streak:  {} current  |  {} best",
        days_label(journal.streak.current),
        days_label(journal.streak.best)
    );
    println!(
        "    Entries: {} this week  |  {} this month  |  {} total",
        journal.stats.this_week, journal.stats.this_month, journal.stats.total
    );
    if let Some(mood) = journal.average_mood_week {
        println!("    Mood:    {:.1} avg this week", mood);
    }
    println!();
}

fn print_todo_stats(ui: &DisplayConfig, todos: &TodoSummary) {
    println_colored!(ui, BOLD, "  Todos");
    println!(
        "    Done:    {}/{}  {}",
        todos.done,
        todos.open + todos.done,
        progress_bar(todos.done, todos.open + todos.done, ui.bar_width)
    );
    println!(
        "    Closed:  {} this week  |  {} this month",
        todos.stats.this_week, todos.stats.this_month
    );
    println!();
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HabitExport {
    #[serde(flatten)]
    summary: HabitSummary,
    entries: Vec<HabitEntry>,
}

#[derive(Serialize)]
struct Export {
    generated_on: String,
    week_start: WeekStart,
    habits: Vec<HabitExport>,
    journal: JournalSummary,
    todos: TodoSummary,
}

pub fn handle_export(store: &Store, ui: &DisplayConfig, json: bool, today: NaiveDate) -> Result<()> {
    let habits = store.active_habits()?;
    let mut exported = Vec::with_capacity(habits.len());
    for habit in &habits {
        exported.push(HabitExport {
            summary: store.habit_summary(habit, today)?,
            entries: store.habit_entries(habit.id)?,
        });
    }

    let export = Export {
        generated_on: format_day(today),
        week_start: store.week_start(),
        habits: exported,
        journal: store.journal_summary(today)?,
        todos: store.todo_summary(today)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&export).context("Serializing export")?);
    } else {
        print!("{}", text_summary(&export, ui));
    }
    Ok(())
}

fn text_summary(export: &Export, ui: &DisplayConfig) -> String {
    let mut out = String::new();
    out.push_str("# streakbook — Weekly Summary\n");
    out.push_str(&format!("# {}\n\n", export.generated_on));

    out.push_str("## Habits (last 7 days)\n");
    for h in &export.habits {
        let bar: String = h
            .summary
            .week
            .iter()
            .map(|c| if c.completed { '█' } else { '░' })
            .collect();
        out.push_str(&format!(
            "  {}  {}  streak {} (best {})  {}%\n",
            pad_display(&h.summary.habit.name, ui.name_width),
            bar,
            h.summary.streak.current,
            h.summary.streak.best,
            percent(h.summary.stats.rate)
        ));
    }

    out.push_str("\n## Summary\n");
    out.push_str(&format!(
        "  Journal:  {} entries this week, streak {}\n",
        export.journal.stats.this_week, export.journal.streak.current
    ));
    out.push_str(&format!(
        "  Todos:    {} done this week, {} open\n",
        export.todos.stats.this_week, export.todos.open
    ));
    out
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &mut AppConfig, action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            print!("{}", toml::to_string_pretty(&*config).context("Serializing config")?);
        }
        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path()?.display());
        }
        ConfigCommands::SetWeekStart { day } => {
            config.stats.week_start = WeekStart::from_str(day)?;
            config.save()?;
            println!("  Week now starts on {}", config.stats.week_start.as_str());
        }
    }
    Ok(())
}
