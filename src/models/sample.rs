//! Focus sample data models.
//!
//! A `Sample` is one periodic observation of the foreground application on a
//! host. Samples are persisted in `HourlyBatch` records keyed by the hour
//! their timestamp truncates to.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

/// Foreground application at capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusedApp {
    pub process: String,
    pub window_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    pub focused: FocusedApp,
    /// Milliseconds since the user last produced input, measured at capture.
    pub idle_ms: u64,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Utc>,
        hostname: impl Into<String>,
        process: impl Into<String>,
        window_title: impl Into<String>,
        idle: Duration,
    ) -> Self {
        Self {
            timestamp,
            hostname: hostname.into(),
            focused: FocusedApp {
                process: process.into(),
                window_title: window_title.into(),
            },
            idle_ms: idle.num_milliseconds().max(0) as u64,
        }
    }

    pub fn idle_duration(&self) -> Duration {
        Duration::milliseconds(self.idle_ms.min(i64::MAX as u64) as i64)
    }

    /// Hour key of the batch this sample belongs to.
    pub fn hour(&self) -> DateTime<Utc> {
        hour_key(self.timestamp)
    }

    /// Composite identity used for de-duplication.
    pub fn key(&self) -> (String, DateTime<Utc>) {
        (self.hostname.clone(), self.timestamp)
    }
}

/// Truncate an instant to the start of its UTC hour.
pub fn hour_key(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    // Truncation only fails at the edges of chrono's representable range.
    timestamp
        .duration_trunc(Duration::hours(1))
        .unwrap_or(timestamp)
}

/// All samples captured during one hour, de-duplicated by `(hostname, timestamp)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBatch {
    pub hour: DateTime<Utc>,
    pub samples: Vec<Sample>,
}

impl HourlyBatch {
    pub fn empty(hour: DateTime<Utc>) -> Self {
        Self {
            hour,
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in capture order (ties broken by hostname).
    pub fn sorted_samples(&self) -> Vec<Sample> {
        let mut samples = self.samples.clone();
        samples.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.hostname.cmp(&b.hostname))
        });
        samples
    }
}
