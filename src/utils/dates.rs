use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Epoch values above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: u64 = 100_000_000_000;

/// First day of the calendar week used for "this week" windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Monday => "monday",
            WeekStart::Sunday => "sunday",
        }
    }

    fn offset_of(&self, date: NaiveDate) -> i64 {
        let weekday = date.weekday();
        match self {
            WeekStart::Monday => weekday.num_days_from_monday() as i64,
            WeekStart::Sunday => weekday.num_days_from_sunday() as i64,
        }
    }
}

impl FromStr for WeekStart {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            _ => Err(anyhow::anyhow!("Unknown week start: {}", s)),
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Resolve a stored date to the local calendar day it falls on.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS`, RFC 3339 with an offset,
/// or a Unix timestamp in seconds or milliseconds. Anything else yields `None`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(epoch) = s.parse::<i64>() {
        return from_epoch(epoch);
    }
    None
}

pub fn from_epoch(epoch: i64) -> Option<NaiveDate> {
    let dt = if epoch.unsigned_abs() > EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(epoch)?
    } else {
        DateTime::from_timestamp(epoch, 0)?
    };
    Some(dt.with_timezone(&Local).date_naive())
}

/// First and last day of the week containing `date`.
pub fn week_bounds(date: NaiveDate, start: WeekStart) -> (NaiveDate, NaiveDate) {
    let first = date - Duration::days(start.offset_of(date));
    (first, first + Duration::days(6))
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Inclusive day count from `from` to `to`; zero or negative when `from` is after `to`.
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_plain_day() {
        assert_eq!(parse_day("2024-03-05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_day("  2024-03-05 "), Some(d(2024, 3, 5)));
    }

    #[test]
    fn test_parse_naive_datetime_keeps_calendar_day() {
        assert_eq!(parse_day("2024-03-05T23:59:00"), Some(d(2024, 3, 5)));
        assert_eq!(parse_day("2024-03-05 08:15:00"), Some(d(2024, 3, 5)));
    }

    #[test]
    fn test_parse_rfc3339_uses_local_day() {
        let raw = "2024-03-05T12:00:00+00:00";
        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(parse_day(raw), Some(expected));
    }

    #[test]
    fn test_parse_epoch_seconds_and_millis() {
        let secs = 1_709_640_000i64;
        let expected = Local.timestamp_opt(secs, 0).unwrap().date_naive();
        assert_eq!(parse_day(&secs.to_string()), Some(expected));
        assert_eq!(parse_day(&(secs * 1000).to_string()), Some(expected));
    }

    #[test]
    fn test_parse_epoch_extremes() {
        assert_eq!(parse_day(&i64::MIN.to_string()), None);
        assert_eq!(parse_day(&i64::MAX.to_string()), None);
        assert_eq!(from_epoch(i64::MIN), None);

        let records = vec![
            crate::models::DatedRecord::new(i64::MIN.to_string(), true),
            crate::models::DatedRecord::on(d(2024, 6, 15), true),
        ];
        let streak = crate::stats::compute_streaks(&records, d(2024, 6, 15));
        assert_eq!((streak.current, streak.best), (1, 1));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day("2024-13-40"), None);
    }

    #[test]
    fn test_week_bounds_monday_start() {
        // 2024-03-06 is a Wednesday
        let (first, last) = week_bounds(d(2024, 3, 6), WeekStart::Monday);
        assert_eq!(first, d(2024, 3, 4));
        assert_eq!(last, d(2024, 3, 10));

        let (first, _) = week_bounds(d(2024, 3, 10), WeekStart::Monday);
        assert_eq!(first, d(2024, 3, 4));
    }

    #[test]
    fn test_week_bounds_sunday_start() {
        let (first, last) = week_bounds(d(2024, 3, 6), WeekStart::Sunday);
        assert_eq!(first, d(2024, 3, 3));
        assert_eq!(last, d(2024, 3, 9));

        let (first, _) = week_bounds(d(2024, 3, 10), WeekStart::Sunday);
        assert_eq!(first, d(2024, 3, 10));
    }

    #[test]
    fn test_days_inclusive() {
        assert_eq!(days_inclusive(d(2024, 3, 1), d(2024, 3, 1)), 1);
        assert_eq!(days_inclusive(d(2024, 3, 1), d(2024, 3, 30)), 30);
        assert_eq!(days_inclusive(d(2024, 3, 5), d(2024, 3, 1)), -3);
    }

    #[test]
    fn test_week_start_from_str() {
        assert_eq!("Sunday".parse::<WeekStart>().unwrap(), WeekStart::Sunday);
        assert_eq!("mon".parse::<WeekStart>().unwrap(), WeekStart::Monday);
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
