use chrono::NaiveDate;

use super::completed_by_day;
use crate::models::{DatedRecord, Streak};

/// Current and best streak of completed days as of `reference`.
///
/// A day that is not completed yet does not break the current streak when it is
/// the reference day itself: the count then ends at the day before.
pub fn compute_streaks(records: &[DatedRecord], reference: NaiveDate) -> Streak {
    let by_day = completed_by_day(records);
    let completed: Vec<NaiveDate> = by_day
        .iter()
        .filter(|(_, done)| **done)
        .map(|(day, _)| *day)
        .collect();

    if completed.is_empty() {
        return Streak::default();
    }

    let best = best_streak(&completed);
    let is_done = |day: NaiveDate| by_day.get(&day).copied().unwrap_or(false);

    let anchor = if is_done(reference) {
        Some(reference)
    } else {
        reference.pred_opt().filter(|&day| is_done(day))
    };

    let mut current = 0u32;
    if let Some(mut day) = anchor {
        while is_done(day) {
            current += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
    }

    let last_day = completed.iter().rev().find(|&&day| day <= reference).copied();

    Streak {
        current,
        best,
        last_day,
    }
}

/// Longest run in an ascending list of distinct completed days.
fn best_streak(days: &[NaiveDate]) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn done(days_ago: i64) -> DatedRecord {
        DatedRecord::on(today() - Duration::days(days_ago), true)
    }

    fn missed(days_ago: i64) -> DatedRecord {
        DatedRecord::on(today() - Duration::days(days_ago), false)
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(compute_streaks(&[], today()), Streak::default());
        let s = compute_streaks(&[], today());
        assert_eq!((s.current, s.best), (0, 0));
    }

    #[test]
    fn test_streak_ending_today() {
        let s = compute_streaks(&[done(0), done(1), done(2)], today());
        assert_eq!(s.current, 3);
        assert_eq!(s.best, 3);
        assert_eq!(s.last_day, Some(today()));
    }

    #[test]
    fn test_old_streak_is_not_current() {
        let s = compute_streaks(&[done(5), done(4), done(3)], today());
        assert_eq!(s.current, 0);
        assert_eq!(s.best, 3);
        assert!(!s.is_active());
    }

    #[test]
    fn test_gap_resets_run() {
        let s = compute_streaks(&[done(1), done(3)], today());
        assert_eq!(s.best, 1);
        assert_eq!(s.current, 1);
    }

    #[test]
    fn test_today_missed_does_not_break_yesterday_streak() {
        let s = compute_streaks(&[missed(0), done(1), done(2)], today());
        assert_eq!(s.current, 2);
    }

    #[test]
    fn test_same_day_any_completed_counts() {
        let s = compute_streaks(&[missed(0), done(0)], today());
        assert_eq!(s.current, 1);
        assert_eq!(s.best, 1);
    }

    #[test]
    fn test_unsorted_input_and_duplicates() {
        let records = vec![done(2), done(0), done(1), done(1), done(10), done(9)];
        let s = compute_streaks(&records, today());
        assert_eq!(s.current, 3);
        assert_eq!(s.best, 3);
    }

    #[test]
    fn test_all_days_completed_without_gaps() {
        let records: Vec<_> = (0..12).map(done).collect();
        let s = compute_streaks(&records, today());
        assert_eq!(s.current, 12);
        assert_eq!(s.best, 12);
    }

    #[test]
    fn test_longer_past_run_is_best() {
        let mut records: Vec<_> = (20..27).map(done).collect();
        records.extend([done(0), done(1)]);
        let s = compute_streaks(&records, today());
        assert_eq!(s.current, 2);
        assert_eq!(s.best, 7);
        assert!(s.best >= s.current);
    }

    #[test]
    fn test_malformed_dates_are_ignored() {
        let records = vec![DatedRecord::new("??", true), done(0)];
        let s = compute_streaks(&records, today());
        assert_eq!((s.current, s.best), (1, 1));
    }

    #[test]
    fn test_only_incomplete_records() {
        let s = compute_streaks(&[missed(0), missed(1)], today());
        assert_eq!(s, Streak::default());
    }

    #[test]
    fn test_future_days_do_not_count_toward_current() {
        let records = vec![done(-1), done(-2)];
        let s = compute_streaks(&records, today());
        assert_eq!(s.current, 0);
        assert_eq!(s.best, 2);
        assert_eq!(s.last_day, None);
    }

    #[test]
    fn test_repeat_calls_agree() {
        let records = vec![done(0), done(1), missed(2), done(3)];
        assert_eq!(
            compute_streaks(&records, today()),
            compute_streaks(&records, today())
        );
    }
}
