use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{HourlyBatch, Sample};

/// Merge fresh samples into the stored batch for `hour`.
///
/// At most one sample survives per `(hostname, timestamp)`; fresh samples
/// replace stored ones on collision. Output is ordered by hostname, then time.
pub fn merge_batch(
    hour: DateTime<Utc>,
    stored: Option<HourlyBatch>,
    fresh: Vec<Sample>,
) -> HourlyBatch {
    let mut unique: BTreeMap<(String, DateTime<Utc>), Sample> = BTreeMap::new();

    let previous = stored.map(|batch| batch.samples).unwrap_or_default();
    for sample in previous.into_iter().chain(fresh) {
        unique.insert(sample.key(), sample);
    }

    HourlyBatch {
        hour,
        samples: unique.into_values().collect(),
    }
}

/// Group samples by the hour they belong to, hours ascending.
pub fn group_by_hour(samples: Vec<Sample>) -> BTreeMap<DateTime<Utc>, Vec<Sample>> {
    let mut hours: BTreeMap<DateTime<Utc>, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        hours.entry(sample.hour()).or_default().push(sample);
    }
    hours
}

/// Number of distinct `(hostname, timestamp)` keys in `samples`.
pub fn distinct_keys(samples: &[Sample]) -> usize {
    samples
        .iter()
        .map(|sample| (sample.hostname.as_str(), sample.timestamp))
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hour() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn sample(host: &str, secs: i64, title: &str) -> Sample {
        Sample::new(
            hour() + Duration::seconds(secs),
            host,
            "chrome",
            title,
            Duration::seconds(1),
        )
    }

    #[test]
    fn first_ingest_creates_batch() {
        let batch = merge_batch(hour(), None, vec![sample("a", 10, "x"), sample("a", 0, "y")]);
        assert_eq!(batch.hour, hour());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.samples[0].timestamp, hour());
    }

    #[test]
    fn duplicates_collapse_by_host_and_timestamp() {
        let stored = merge_batch(hour(), None, vec![sample("a", 0, "x"), sample("b", 0, "x")]);
        let merged = merge_batch(
            hour(),
            Some(stored),
            vec![sample("a", 0, "x"), sample("a", 10, "x"), sample("a", 10, "x")],
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(distinct_keys(&merged.samples), 3);
    }

    #[test]
    fn fresh_sample_wins_on_collision() {
        let stored = merge_batch(hour(), None, vec![sample("a", 0, "old")]);
        let merged = merge_batch(hour(), Some(stored), vec![sample("a", 0, "new")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.samples[0].focused.window_title, "new");
    }

    #[test]
    fn reingesting_identical_batch_is_idempotent() {
        let fresh = vec![sample("a", 0, "x"), sample("a", 10, "y"), sample("b", 5, "z")];
        let once = merge_batch(hour(), None, fresh.clone());
        let twice = merge_batch(hour(), Some(once.clone()), fresh);
        assert_eq!(once, twice);
    }

    #[test]
    fn groups_samples_by_truncated_hour() {
        let samples = vec![
            sample("a", 3_700, "next hour"),
            sample("a", 10, "this hour"),
            sample("a", 3_599, "this hour"),
        ];
        let grouped = group_by_hour(samples);
        let keys: Vec<_> = grouped.keys().copied().collect();
        assert_eq!(keys, vec![hour(), hour() + Duration::hours(1)]);
        assert_eq!(grouped[&hour()].len(), 2);
    }
}
