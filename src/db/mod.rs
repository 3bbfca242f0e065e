pub mod migrations;
pub mod repository;

use thiserror::Error;

/// Failures the storage layer reports about the user's data rather than SQLite.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Habit '{0}' not found")]
    HabitNotFound(String),
    #[error("Habit '{0}' already exists")]
    DuplicateHabit(String),
    #[error("Todo #{0} not found")]
    TodoNotFound(i64),
    #[error("Mood must be between 1 and 5, got {0}")]
    InvalidMood(u8),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
