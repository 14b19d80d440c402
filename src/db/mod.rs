//! SQLite-backed event store.

mod connection;
mod helpers;
mod migrations;
mod repositories;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use connection::Database;

use crate::models::{HourlyBatch, PracticePiece};
use crate::store::EventStore;

#[async_trait]
impl EventStore for Database {
    async fn get(&self, hour: DateTime<Utc>) -> Result<Option<HourlyBatch>> {
        self.get_hourly_batch(hour).await
    }

    async fn put(&self, batch: &HourlyBatch) -> Result<()> {
        self.upsert_hourly_batch(batch).await
    }

    async fn latest(&self, limit: usize) -> Result<Vec<HourlyBatch>> {
        self.latest_hourly_batches(limit).await
    }

    async fn put_piece(&self, piece: &PracticePiece) -> Result<()> {
        self.upsert_practice_piece(piece).await
    }

    async fn pieces_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PracticePiece>> {
        self.practice_pieces_between(start, end).await
    }
}
