use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::EventStore;
use crate::models::{HourlyBatch, PracticePiece};

#[derive(Default)]
struct MemoryInner {
    batches: BTreeMap<DateTime<Utc>, HourlyBatch>,
    pieces: BTreeMap<DateTime<Utc>, PracticePiece>,
    failing_hours: BTreeSet<DateTime<Utc>>,
}

/// Process-local store for tests and throwaway runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `hour` fail until cleared.
    pub async fn fail_writes_at(&self, hour: DateTime<Utc>) {
        self.inner.write().await.failing_hours.insert(hour);
    }

    pub async fn clear_failures(&self) {
        self.inner.write().await.failing_hours.clear();
    }

    pub async fn batch_count(&self) -> usize {
        self.inner.read().await.batches.len()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn get(&self, hour: DateTime<Utc>) -> Result<Option<HourlyBatch>> {
        Ok(self.inner.read().await.batches.get(&hour).cloned())
    }

    async fn put(&self, batch: &HourlyBatch) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.failing_hours.contains(&batch.hour) {
            bail!("write to hour {} rejected", batch.hour);
        }
        inner.batches.insert(batch.hour, batch.clone());
        Ok(())
    }

    async fn latest(&self, limit: usize) -> Result<Vec<HourlyBatch>> {
        Ok(self
            .inner
            .read()
            .await
            .batches
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn put_piece(&self, piece: &PracticePiece) -> Result<()> {
        self.inner
            .write()
            .await
            .pieces
            .insert(piece.started_at, piece.clone());
        Ok(())
    }

    async fn pieces_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PracticePiece>> {
        if end <= start {
            return Ok(Vec::new());
        }
        Ok(self
            .inner
            .read()
            .await
            .pieces
            .range(start..end)
            .map(|(_, piece)| piece.clone())
            .collect())
    }
}
