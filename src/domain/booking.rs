// src/domain/booking.rs

use serde::{Deserialize, Serialize};

/// One scheduled session as it appears in the booking table.
///
/// The serde names match the state file layout the bot has always written
/// (`{"game": .., "time": .., "responsible": ..}`), so older snapshots load as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(rename = "game")]
    pub activity_code: String,
    pub time: String,
    pub responsible: String,
}

/// Identity of a booking within one date's snapshot.
/// Uses the full activity string, not the 3-character display code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookingKey<'a> {
    pub activity_code: &'a str,
    pub time: &'a str,
}

impl BookingRecord {
    pub fn new(
        activity_code: impl Into<String>,
        time: impl Into<String>,
        responsible: impl Into<String>,
    ) -> Self {
        Self {
            activity_code: activity_code.into(),
            time: time.into(),
            responsible: responsible.into(),
        }
    }

    pub fn key(&self) -> BookingKey<'_> {
        BookingKey {
            activity_code: &self.activity_code,
            time: &self.time,
        }
    }

    /// First three characters of the activity name (by char, not byte).
    pub fn short_code(&self) -> &str {
        match self.activity_code.char_indices().nth(3) {
            Some((idx, _)) => &self.activity_code[..idx],
            None => &self.activity_code,
        }
    }
}
