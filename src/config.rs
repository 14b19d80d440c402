use anyhow::{Context, Result};
use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::error::UsageError;

/// Upper bound for every duration key: one week.
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Tunable parameters for reconstruction and categorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Idle time at or above which a sample counts as idle evidence
    pub idle_timeout_secs: u64,

    /// Nominal sampler period; also the unit of every accumulated duration
    pub sampling_period_secs: u64,

    /// Jitter tolerated on top of the period before a run is split
    pub merge_slack_secs: u64,

    /// Ordered editor patterns; capture group 1 is the project name
    pub project_patterns: Vec<String>,

    pub browser_processes: Vec<String>,
    pub editor_processes: Vec<String>,

    /// Category label for practice pieces
    pub practice_label: String,

    /// Hostname given to raw records that carry none
    pub default_hostname: String,

    /// Offset defining local midnight for daily reports
    pub utc_offset_secs: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 300,
            sampling_period_secs: 10,
            merge_slack_secs: 2,
            project_patterns: vec![
                "~/Dropbox/Programmieren/([^/]+)/.*".into(),
                "~/Programmieren/([^/]+)/.*".into(),
                "~/([^/]+)/google3/.*".into(),
            ],
            browser_processes: vec!["chrome".into()],
            editor_processes: vec!["sublime_text".into()],
            practice_label: "piano".into(),
            default_hostname: "unknown-host".into(),
            utc_offset_secs: 0,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), UsageError> {
        if self.sampling_period_secs == 0 {
            return Err(UsageError::InvalidConfig(
                "sampling_period_secs must be greater than zero".into(),
            ));
        }
        if self.idle_timeout_secs == 0 {
            return Err(UsageError::InvalidConfig(
                "idle_timeout_secs must be greater than zero".into(),
            ));
        }
        for (key, value) in [
            ("idle_timeout_secs", self.idle_timeout_secs),
            ("sampling_period_secs", self.sampling_period_secs),
            ("merge_slack_secs", self.merge_slack_secs),
        ] {
            if value > MAX_DURATION_SECS {
                return Err(UsageError::InvalidConfig(format!(
                    "{key} {value} exceeds the maximum of {MAX_DURATION_SECS}"
                )));
            }
        }
        if FixedOffset::east_opt(self.utc_offset_secs).is_none() {
            return Err(UsageError::InvalidConfig(format!(
                "utc_offset_secs {} is out of range",
                self.utc_offset_secs
            )));
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        bounded_seconds(self.idle_timeout_secs)
    }

    pub fn sampling_period(&self) -> Duration {
        bounded_seconds(self.sampling_period_secs)
    }

    pub fn merge_slack(&self) -> Duration {
        bounded_seconds(self.merge_slack_secs)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Seconds as a `Duration`, saturating at `MAX_DURATION_SECS`.
fn bounded_seconds(value: u64) -> Duration {
    Duration::seconds(value.min(MAX_DURATION_SECS) as i64)
}
