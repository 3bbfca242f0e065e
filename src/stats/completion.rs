use chrono::NaiveDate;

use crate::models::{CompletionStats, DatedRecord};
use crate::utils::dates::{WeekStart, days_inclusive, same_month, week_bounds};

/// Completion counts over trailing calendar windows plus an overall rate.
///
/// Counts are of completed records, not distinct days. `rate` divides the all-time
/// count by the inclusive number of days from the earliest record to `reference`.
pub fn compute_stats(
    records: &[DatedRecord],
    reference: NaiveDate,
    week_start: WeekStart,
) -> CompletionStats {
    let (week_first, week_last) = week_bounds(reference, week_start);

    let mut stats = CompletionStats::default();
    let mut earliest: Option<NaiveDate> = None;

    for record in records {
        let Some(day) = record.day() else {
            continue;
        };
        earliest = Some(earliest.map_or(day, |e| e.min(day)));

        if !record.completed {
            continue;
        }
        stats.total += 1;
        if day >= week_first && day <= week_last {
            stats.this_week += 1;
        }
        if same_month(day, reference) {
            stats.this_month += 1;
        }
    }

    stats.rate = match earliest {
        Some(first) => {
            let elapsed = days_inclusive(first, reference);
            if elapsed > 0 {
                (stats.total as f64 / elapsed as f64).min(1.0)
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    stats
}
