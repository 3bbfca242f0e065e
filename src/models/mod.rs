pub mod habit;
pub mod journal;
pub mod record;
pub mod stats;
pub mod todo;

pub use habit::{Habit, HabitEntry};
pub use journal::JournalEntry;
pub use record::DatedRecord;
pub use stats::{CompletionStats, DayCell, Streak};
pub use todo::{Priority, Todo};
