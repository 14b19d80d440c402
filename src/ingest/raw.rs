//! Wire formats posted by the desktop sampler and the MIDI recorder.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

use crate::models::{Note, PracticePiece, Sample};

#[derive(Debug, Clone, Deserialize)]
pub struct RawApp {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exec: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUsage {
    /// Unix seconds, fractional.
    pub time: f64,
    #[serde(default)]
    pub focused: Vec<RawApp>,
    #[serde(default)]
    pub visible: Vec<RawApp>,
    #[serde(default)]
    pub last_activity_ms: f64,
    #[serde(default)]
    pub hostname: String,
}

impl RawUsage {
    /// Convert into a sample; records without a focused app carry no usage.
    pub fn into_sample(self, default_hostname: &str) -> Option<Sample> {
        let focused = self.focused.into_iter().next()?;
        let timestamp = unix_seconds(self.time)?;
        let hostname = if self.hostname.is_empty() {
            default_hostname.to_string()
        } else {
            self.hostname
        };
        let idle_ms = if self.last_activity_ms.is_finite() {
            self.last_activity_ms.max(0.0) as i64
        } else {
            0
        };

        Some(Sample::new(
            timestamp,
            hostname,
            focused.exec,
            focused.name,
            Duration::milliseconds(idle_ms),
        ))
    }
}

/// Parse a sampler payload into samples, dropping records with nothing focused.
pub fn parse_usage_payload(payload: &str, default_hostname: &str) -> serde_json::Result<Vec<Sample>> {
    let records: Vec<RawUsage> = serde_json::from_str(payload)?;
    Ok(records
        .into_iter()
        .filter_map(|record| record.into_sample(default_hostname))
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNote {
    pub status: i16,
    pub data1: i16,
    pub data2: i16,
    pub data3: i16,
    #[serde(default)]
    pub relative_timestamp: i32,
    /// Unix seconds, fractional.
    pub absolute_timestamp: f64,
}

impl RawNote {
    fn into_note(self) -> Option<Note> {
        let whole = self.absolute_timestamp.floor();
        let nanos = ((self.absolute_timestamp - whole) * 1e9) as u32;
        let absolute_timestamp = Utc.timestamp_opt(whole as i64, nanos).single()?;
        Some(Note {
            status: self.status,
            data1: self.data1,
            data2: self.data2,
            data3: self.data3,
            relative_timestamp: self.relative_timestamp,
            absolute_timestamp,
        })
    }
}

/// Parse a MIDI recorder payload into a practice piece.
pub fn parse_practice_payload(payload: &str) -> anyhow::Result<PracticePiece> {
    let raw: Vec<RawNote> = serde_json::from_str(payload)?;
    let notes: Vec<Note> = raw.into_iter().filter_map(RawNote::into_note).collect();
    PracticePiece::from_notes(notes).map_err(anyhow::Error::from)
}

/// Whole-second instant for fractional unix seconds.
fn unix_seconds(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    Utc.timestamp_opt(value.trunc() as i64, 0).single()
}
