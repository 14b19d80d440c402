use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{hour_from_key, to_i64},
};
use crate::models::{HourlyBatch, Sample};

fn row_to_batch(row: &Row) -> Result<HourlyBatch> {
    let hour: i64 = row.get("hour")?;
    let samples_json: String = row.get("samples_json")?;
    let samples: Vec<Sample> = serde_json::from_str(&samples_json)
        .with_context(|| format!("failed to decode samples for hour {hour}"))?;

    Ok(HourlyBatch {
        hour: hour_from_key(hour)?,
        samples,
    })
}

impl Database {
    pub async fn get_hourly_batch(&self, hour: DateTime<Utc>) -> Result<Option<HourlyBatch>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT hour, samples_json FROM hourly_batches WHERE hour = ?1",
            )?;
            let batch = stmt
                .query_row(params![hour.timestamp()], |row| Ok(row_to_batch(row)))
                .optional()
                .with_context(|| format!("failed to load hourly batch {hour}"))?;
            batch.transpose()
        })
        .await
    }

    /// Insert or replace the batch stored under its hour.
    pub async fn upsert_hourly_batch(&self, batch: &HourlyBatch) -> Result<()> {
        let hour = batch.hour;
        let samples_json =
            serde_json::to_string(&batch.samples).context("failed to encode samples")?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO hourly_batches (hour, samples_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(hour) DO UPDATE SET
                     samples_json = excluded.samples_json,
                     updated_at = excluded.updated_at",
                params![hour.timestamp(), samples_json, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to store hourly batch {hour}"))?;
            Ok(())
        })
        .await
    }

    pub async fn latest_hourly_batches(&self, limit: usize) -> Result<Vec<HourlyBatch>> {
        let limit = to_i64(limit as u64)?;
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT hour, samples_json FROM hourly_batches
                 ORDER BY hour DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![limit])?;
            let mut batches = Vec::new();
            while let Some(row) = rows.next()? {
                batches.push(row_to_batch(row)?);
            }
            Ok(batches)
        })
        .await
    }
}
