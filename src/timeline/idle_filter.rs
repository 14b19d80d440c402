//! Confirm-on-future-evidence filter for one host's sample stream.
//!
//! Samples only carry a backward-looking idle signal, so a sample is held as
//! pending until a later low-idle sample proves the user was active more than
//! one idle timeout after it. A high-idle sample instead proves the machine sat
//! idle, and everything still pending is dropped.

use chrono::{DateTime, Duration, Utc};

use crate::error::UsageError;
use crate::models::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    /// Samples are arriving; pending entries wait for vindication.
    Accumulating,
    /// End of stream reached; every surviving entry has been confirmed.
    Flushed,
}

#[derive(Debug)]
pub struct SessionFilter {
    hostname: String,
    idle_timeout: Duration,
    pending: Vec<Sample>,
    /// Index of the oldest pending entry not yet confirmed.
    cursor: usize,
    last_timestamp: Option<DateTime<Utc>>,
    phase: FilterPhase,
    discarded: usize,
}

impl SessionFilter {
    pub fn new(hostname: impl Into<String>, idle_timeout: Duration) -> Self {
        Self {
            hostname: hostname.into(),
            idle_timeout,
            pending: Vec::new(),
            cursor: 0,
            last_timestamp: None,
            phase: FilterPhase::Accumulating,
            discarded: 0,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    /// Samples dropped so far as idle residue.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.cursor
    }

    /// Feed the next sample; returns the samples it confirmed, oldest first.
    pub fn push(&mut self, sample: Sample) -> Result<Vec<Sample>, UsageError> {
        if self.phase == FilterPhase::Flushed {
            return Err(UsageError::FilterFlushed {
                hostname: self.hostname.clone(),
            });
        }
        if let Some(previous) = self.last_timestamp {
            if sample.timestamp < previous {
                return Err(UsageError::OutOfOrder {
                    hostname: self.hostname.clone(),
                    previous,
                    got: sample.timestamp,
                });
            }
        }
        self.last_timestamp = Some(sample.timestamp);

        let is_active = sample.idle_duration() < self.idle_timeout;
        let horizon = sample.timestamp - self.idle_timeout;
        self.pending.push(sample);

        if !is_active {
            self.discarded += self.pending.len() - self.cursor;
            self.pending.clear();
            self.cursor = 0;
            return Ok(Vec::new());
        }

        let start = self.cursor;
        while self.cursor < self.pending.len() && self.pending[self.cursor].timestamp < horizon {
            self.cursor += 1;
        }

        // Confirmed entries are never revisited; hand them out and compact.
        let confirmed: Vec<Sample> = self.pending.drain(start..self.cursor).collect();
        self.cursor = start;
        Ok(confirmed)
    }

    /// End of stream: nothing later can contradict what is still pending.
    pub fn finish(&mut self) -> Vec<Sample> {
        self.phase = FilterPhase::Flushed;
        let confirmed = self.pending.split_off(self.cursor);
        self.pending.clear();
        self.cursor = 0;
        confirmed
    }
}

/// Run a full, sorted stream through a fresh filter.
pub fn confirm_stream<I>(
    hostname: &str,
    idle_timeout: Duration,
    samples: I,
) -> Result<Vec<Sample>, UsageError>
where
    I: IntoIterator<Item = Sample>,
{
    let mut filter = SessionFilter::new(hostname, idle_timeout);
    let mut confirmed = Vec::new();
    for sample in samples {
        confirmed.extend(filter.push(sample)?);
    }
    confirmed.extend(filter.finish());
    Ok(confirmed)
}
