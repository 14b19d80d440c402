use chrono::{DateTime, Duration, Utc};

use crate::models::{HostTimeline, Interval, Timeline};

/// Label of the zero-width intervals pinning the window edges.
pub const SPACER_LABEL: &str = "spacers";

/// Gap rule for splitting a run of confirmed timestamps.
#[derive(Debug, Clone, Copy)]
pub struct MergeTolerance {
    pub period: Duration,
    pub slack: Duration,
}

impl MergeTolerance {
    pub fn new(period: Duration, slack: Duration) -> Self {
        Self { period, slack }
    }

    /// Largest gap that still continues a run (inclusive).
    pub fn max_gap(&self) -> Duration {
        self.period + self.slack
    }
}

/// Collapse one host's ascending confirmed timestamps into intervals.
pub fn merge_host(
    hostname: &str,
    timestamps: &[DateTime<Utc>],
    tolerance: MergeTolerance,
) -> HostTimeline {
    let mut intervals = Vec::new();
    let max_gap = tolerance.max_gap();

    let mut iter = timestamps.iter().copied();
    if let Some(first) = iter.next() {
        let mut start = first;
        let mut last = first;

        for timestamp in iter {
            if timestamp - last > max_gap {
                intervals.push(Interval {
                    hostname: hostname.to_string(),
                    start_time: start,
                    end_time: last,
                });
                start = timestamp;
            }
            last = timestamp;
        }

        intervals.push(Interval {
            hostname: hostname.to_string(),
            start_time: start,
            end_time: last,
        });
    }

    HostTimeline {
        hostname: hostname.to_string(),
        intervals,
    }
}

/// Merge every host and bracket the result with the window sentinels.
///
/// Hosts without timestamps are omitted; hosts come out sorted by name.
pub fn build_timeline<'a, I>(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    hosts: I,
    tolerance: MergeTolerance,
) -> Timeline
where
    I: IntoIterator<Item = (&'a str, &'a [DateTime<Utc>])>,
{
    let mut timelines: Vec<HostTimeline> = hosts
        .into_iter()
        .filter(|(_, timestamps)| !timestamps.is_empty())
        .map(|(hostname, timestamps)| merge_host(hostname, timestamps, tolerance))
        .collect();
    timelines.sort_by(|a, b| a.hostname.cmp(&b.hostname));

    let total_secs = timelines
        .iter()
        .flat_map(|host| host.intervals.iter())
        .map(|interval| interval.duration().num_seconds())
        .sum();

    Timeline {
        spacers: [spacer(window_start), spacer(window_end)],
        hosts: timelines,
        total_secs,
    }
}

fn spacer(at: DateTime<Utc>) -> Interval {
    Interval {
        hostname: SPACER_LABEL.to_string(),
        start_time: at,
        end_time: at,
    }
}
