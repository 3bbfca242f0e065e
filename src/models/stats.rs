use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current and longest run of completed days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
    /// Most recent completed day on or before the reference date
    pub last_day: Option<NaiveDate>,
}

impl Streak {
    pub fn is_active(&self) -> bool {
        self.current > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionStats {
    pub total: u32,
    pub this_week: u32,
    pub this_month: u32,
    /// Completed records per elapsed day since the first record, in `[0, 1]`
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub completed: bool,
}
