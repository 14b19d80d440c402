//! Error types for usage-timeline operations.
//!
//! Store internals and config loading use `anyhow`; everything crossing the
//! engine boundary is converted into `UsageError`.

use chrono::{DateTime, Utc};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    // ─────────────────────────────────────────────────────────────────────
    // Store Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("failed to read hourly batch {hour}: {source}")]
    StoreRead {
        hour: DateTime<Utc>,
        #[source]
        source: BoxError,
    },

    #[error("failed to write hourly batch {hour}: {source}")]
    StoreWrite {
        hour: DateTime<Utc>,
        #[source]
        source: BoxError,
    },

    #[error("store operation '{operation}' failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("invalid project pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ─────────────────────────────────────────────────────────────────────
    // Input Contract Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("sample for host {hostname} at {got} arrived after {previous}; input must be sorted")]
    OutOfOrder {
        hostname: String,
        previous: DateTime<Utc>,
        got: DateTime<Utc>,
    },

    #[error("session filter for host {hostname} was already flushed")]
    FilterFlushed { hostname: String },

    #[error("a practice piece needs at least one note")]
    EmptyPiece,
}

impl UsageError {
    pub fn store_read(hour: DateTime<Utc>, err: anyhow::Error) -> Self {
        UsageError::StoreRead {
            hour,
            source: err.into(),
        }
    }

    pub fn store_write(hour: DateTime<Utc>, err: anyhow::Error) -> Self {
        UsageError::StoreWrite {
            hour,
            source: err.into(),
        }
    }

    pub fn store(operation: &'static str, err: anyhow::Error) -> Self {
        UsageError::Store {
            operation,
            source: err.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;
