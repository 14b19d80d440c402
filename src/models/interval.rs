use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous span of confirmed activity on one host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub hostname: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostTimeline {
    pub hostname: String,
    pub intervals: Vec<Interval>,
}

/// Per-host intervals for a requested window plus the two zero-width
/// sentinels pinning the window edges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub spacers: [Interval; 2],
    pub hosts: Vec<HostTimeline>,
    pub total_secs: i64,
}

impl Timeline {
    pub fn host(&self, hostname: &str) -> Option<&HostTimeline> {
        self.hosts.iter().find(|host| host.hostname == hostname)
    }
}
