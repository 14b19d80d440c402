//! One reconstruction pass: session filter, interval merge and categorization
//! over a bounded window of stored history.

pub mod day;
pub mod idle_filter;
pub mod merge;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::categorize::{CategoryNode, UsageTree};
use crate::config::EngineConfig;
use crate::error::UsageError;
use crate::models::{HourlyBatch, PracticePiece, Sample, Timeline};
use crate::{log_debug, log_info};

pub use day::{day_window, hours_in_window, local_date};
pub use idle_filter::{confirm_stream, FilterPhase, SessionFilter};
pub use merge::{build_timeline, merge_host, MergeTolerance, SPACER_LABEL};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize)]
pub struct Reconstruction {
    pub usage: CategoryNode,
    pub timeline: Timeline,
}

impl Reconstruction {
    pub fn total_secs(&self) -> i64 {
        self.timeline.total_secs
    }
}

/// Reconstruct `[window_start, window_end)` from already retrieved batches.
///
/// Batches may straddle the window edges; only samples inside the window
/// take part. Hosts are filtered independently and in hostname order.
pub fn reconstruct(
    batches: &[HourlyBatch],
    pieces: &[PracticePiece],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &EngineConfig,
    mut tree: UsageTree,
) -> Result<Reconstruction, UsageError> {
    let mut by_host: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
    let in_window = batches
        .iter()
        .flat_map(|batch| batch.samples.iter())
        .filter(|sample| sample.timestamp >= window_start && sample.timestamp < window_end);
    for sample in in_window {
        by_host
            .entry(sample.hostname.as_str())
            .or_default()
            .push(sample);
    }

    let idle_timeout = config.idle_timeout();
    let mut confirmed_by_host: BTreeMap<&str, Vec<DateTime<Utc>>> = BTreeMap::new();

    for (hostname, mut samples) in by_host {
        samples.sort_by_key(|sample| sample.timestamp);

        let mut filter = SessionFilter::new(hostname, idle_timeout);
        let mut timestamps = Vec::with_capacity(samples.len());
        for sample in samples {
            for confirmed in filter.push(sample.clone())? {
                tree.record(&confirmed);
                timestamps.push(confirmed.timestamp);
            }
        }
        for confirmed in filter.finish() {
            tree.record(&confirmed);
            timestamps.push(confirmed.timestamp);
        }

        log_debug!(
            "host {}: {} confirmed, {} discarded as idle",
            filter.hostname(),
            timestamps.len(),
            filter.discarded()
        );
        confirmed_by_host.insert(hostname, timestamps);
    }

    let mut practiced = 0;
    for piece in pieces
        .iter()
        .filter(|piece| piece.started_at >= window_start && piece.started_at < window_end)
    {
        tree.record_practice(piece);
        practiced += 1;
    }

    let tolerance = MergeTolerance::new(config.sampling_period(), config.merge_slack());
    let timeline = build_timeline(
        window_start,
        window_end,
        confirmed_by_host
            .iter()
            .map(|(hostname, timestamps)| (*hostname, timestamps.as_slice())),
        tolerance,
    );

    log_info!(
        "Reconstructed {} -> {}: {} hosts, {} practice pieces, {}s active",
        window_start,
        window_end,
        timeline.hosts.len(),
        practiced,
        timeline.total_secs
    );

    Ok(Reconstruction {
        usage: tree.serialize(),
        timeline,
    })
}
