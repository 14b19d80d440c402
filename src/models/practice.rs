//! Music practice data models.
//!
//! A practice piece is a run of MIDI notes captured from an instrument. The
//! engine only needs its start and length; the notes are kept so a piece can be
//! replayed or re-analysed later.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UsageError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub status: i16,
    pub data1: i16,
    pub data2: i16,
    pub data3: i16,
    pub relative_timestamp: i32,
    pub absolute_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PracticePiece {
    pub started_at: DateTime<Utc>,
    pub length_ms: i64,
    pub notes: Vec<Note>,
}

impl PracticePiece {
    /// Build a piece from notes in any order.
    pub fn from_notes(mut notes: Vec<Note>) -> Result<Self, UsageError> {
        notes.sort_by_key(|note| note.absolute_timestamp);

        let (first, last) = match (notes.first(), notes.last()) {
            (Some(first), Some(last)) => (first.absolute_timestamp, last.absolute_timestamp),
            _ => return Err(UsageError::EmptyPiece),
        };

        Ok(Self {
            started_at: first,
            length_ms: (last - first).num_milliseconds(),
            notes,
        })
    }

    pub fn length(&self) -> Duration {
        Duration::milliseconds(self.length_ms)
    }

    /// Number of sampling periods this piece accounts for; never zero.
    pub fn sampling_units(&self, period: Duration) -> u64 {
        let period_ms = period.num_milliseconds();
        if period_ms <= 0 {
            return 1;
        }
        let length_ms = self.length_ms.max(0);
        let units = (length_ms + period_ms - 1) / period_ms;
        units.max(1) as u64
    }
}
