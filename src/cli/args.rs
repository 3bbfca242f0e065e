use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "streakbook", version, author, about = "A terminal companion for habits, todos and journaling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Habit tracking
    Habit {
        #[command(subcommand)]
        action: HabitCommands,
    },
    /// Todo list
    Todo {
        #[command(subcommand)]
        action: TodoCommands,
    },
    /// Daily journal
    Journal {
        #[command(subcommand)]
        action: JournalCommands,
    },
    /// Show streaks and completion statistics
    Stats {
        /// Only this habit
        #[arg(long)]
        habit: Option<String>,
        /// Show a heatmap for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Export a weekly text summary (or everything as JSON) to stdout
    Export {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Start tracking a new habit
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List active habits with their streaks
    List,
    /// Mark a habit as done (today unless --date is given)
    Check {
        name: String,
        /// Day to mark, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Mark a habit as not done
    Uncheck {
        name: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Stop tracking a habit, keeping its history
    Archive { name: String },
    /// Load entries from a JSON array of {"date": ..., "completed": ...}
    Import { name: String, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum TodoCommands {
    /// Add a todo
    Add {
        title: String,
        /// low, normal or high
        #[arg(long, default_value = "normal")]
        priority: String,
    },
    /// Show open todos
    List {
        /// Include finished todos
        #[arg(long)]
        all: bool,
    },
    /// Mark a todo as done
    Done { id: i64 },
    /// Mark a finished todo as open again
    Reopen { id: i64 },
    /// Delete a todo
    Remove { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    /// Write a journal entry
    Write {
        text: String,
        /// Mood from 1 (awful) to 5 (great)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: Option<u8>,
        /// Day of the entry, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Show recent entries
    List {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Print the config file location
    Path,
    /// Set the first day of the week (monday or sunday)
    SetWeekStart { day: String },
}
