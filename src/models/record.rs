use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::dates::{format_day, parse_day};

/// A date plus a completion flag; the unit the streak and stats calculators consume.
///
/// `occurred_on` is kept as the raw stored text. It is resolved to a local calendar
/// day on demand, and records whose date cannot be resolved are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedRecord {
    #[serde(alias = "date", default, deserialize_with = "de_date_text")]
    pub occurred_on: String,
    #[serde(alias = "isCompleted", alias = "is_completed")]
    pub completed: bool,
}

impl DatedRecord {
    pub fn new(occurred_on: impl Into<String>, completed: bool) -> Self {
        Self {
            occurred_on: occurred_on.into(),
            completed,
        }
    }

    pub fn on(date: NaiveDate, completed: bool) -> Self {
        Self::new(format_day(date), completed)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.occurred_on)
    }
}

/// Dates arrive either as strings or as bare epoch numbers. Anything else
/// (null, objects, booleans) becomes empty text, which never resolves to a day.
fn de_date_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => (f as i64).to_string(),
        Raw::Other(_) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_resolves_or_skips() {
        assert_eq!(
            DatedRecord::new("2024-01-02", true).day(),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(DatedRecord::new("not a date", true).day(), None);
    }

    #[test]
    fn test_deserialize_json_shapes() {
        let json = r#"[
            {"date": "2024-01-02", "completed": true},
            {"occurred_on": "2024-01-03", "isCompleted": false},
            {"date": 1704240000, "completed": true}
        ]"#;
        let records: Vec<DatedRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].occurred_on, "2024-01-02");
        assert!(!records[1].completed);
        assert_eq!(records[2].occurred_on, "1704240000");
        assert!(records[2].day().is_some());
    }

    #[test]
    fn test_unusable_dates_become_undated_records() {
        let json = r#"[
            {"date": null, "completed": true},
            {"completed": true},
            {"date": {"day": 2}, "completed": false},
            {"date": "2024-01-02", "completed": true}
        ]"#;
        let records: Vec<DatedRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records[..3].iter().all(|r| r.day().is_none()));
        assert_eq!(records[3].day(), NaiveDate::from_ymd_opt(2024, 1, 2));
    }
}
