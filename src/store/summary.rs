use serde::Serialize;

use crate::models::{CompletionStats, DayCell, Habit, Streak};

#[derive(Debug, Clone, Serialize)]
pub struct HabitSummary {
    pub habit: Habit,
    pub streak: Streak,
    pub stats: CompletionStats,
    pub done_today: bool,
    pub week: Vec<DayCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalSummary {
    pub streak: Streak,
    pub stats: CompletionStats,
    pub written_today: bool,
    pub average_mood_week: Option<f64>,
    pub average_mood_month: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoSummary {
    pub open: u32,
    pub done: u32,
    pub stats: CompletionStats,
}

impl TodoSummary {
    /// Share of all todos that are done
    pub fn done_ratio(&self) -> f64 {
        let all = self.open + self.done;
        if all == 0 {
            0.0
        } else {
            self.done as f64 / all as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub days: u32,
    pub skipped: u32,
}
