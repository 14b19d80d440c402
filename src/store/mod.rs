//! Event store interface.
//!
//! Raw samples are persisted as one record per truncated hour; practice
//! pieces are persisted alongside, keyed by their start.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{HourlyBatch, PracticePiece};

pub use memory::MemoryStore;

/// Key-value persistence for hourly sample batches.
///
/// Implementations must tolerate concurrent callers; callers that need
/// read-modify-write atomicity per hour serialize themselves.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Batch stored under `hour`, if any.
    async fn get(&self, hour: DateTime<Utc>) -> Result<Option<HourlyBatch>>;

    /// Insert or replace the batch under its hour key.
    async fn put(&self, batch: &HourlyBatch) -> Result<()>;

    /// Up to `limit` batches, newest hour first.
    async fn latest(&self, limit: usize) -> Result<Vec<HourlyBatch>>;

    /// Insert or replace a practice piece keyed by its start.
    async fn put_piece(&self, piece: &PracticePiece) -> Result<()>;

    /// Pieces starting in `[start, end)`, oldest first.
    async fn pieces_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PracticePiece>>;
}
