//! Streak and completion statistics over dated records.
//!
//! Everything here is a pure function of its arguments: callers hand in a snapshot
//! of records plus a reference date and get plain numbers back.

pub mod completion;
pub mod streak;

use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{DatedRecord, DayCell};

pub use completion::compute_stats;
pub use streak::compute_streaks;

/// Collapse records to one flag per calendar day; a day is completed if any of
/// its records is. Records with unresolvable dates are dropped.
pub(crate) fn completed_by_day(records: &[DatedRecord]) -> BTreeMap<NaiveDate, bool> {
    let mut days: BTreeMap<NaiveDate, bool> = BTreeMap::new();
    for record in records {
        match record.day() {
            Some(day) => {
                let slot = days.entry(day).or_insert(false);
                *slot = *slot || record.completed;
            }
            None => log::debug!("skipping record with unreadable date {:?}", record.occurred_on),
        }
    }
    days
}

/// One cell per day for the `days` days ending at `reference`, oldest first.
pub fn daily_grid(records: &[DatedRecord], reference: NaiveDate, days: u32) -> Vec<DayCell> {
    let by_day = completed_by_day(records);
    (0..days as i64)
        .rev()
        .map(|back| {
            let date = reference - Duration::days(back);
            DayCell {
                date,
                completed: by_day.get(&date).copied().unwrap_or(false),
            }
        })
        .collect()
}
