use serde::{Deserialize, Serialize};

pub const MOOD_MIN: u8 = 1;
pub const MOOD_MAX: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub date: String,
    /// 1 (low) to 5 (great)
    pub mood: Option<u8>,
    pub body: String,
}

pub fn mood_label(mood: u8) -> &'static str {
    match mood {
        1 => "awful",
        2 => "low",
        3 => "okay",
        4 => "good",
        5 => "great",
        _ => "?",
    }
}

/// Mean mood over entries that recorded one.
pub fn average_mood<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Option<f64> {
    let (sum, count) = entries
        .into_iter()
        .filter_map(|e| e.mood)
        .fold((0u32, 0u32), |(s, c), m| (s + m as u32, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}
