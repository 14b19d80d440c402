//! The usage engine: ingestion into the event store and reconstruction
//! passes over it.

use chrono::{DateTime, NaiveDate, Utc};

use crate::categorize::{ClassifierRegistry, UsageTree};
use crate::config::EngineConfig;
use crate::error::{Result, UsageError};
use crate::ingest::{group_by_hour, merge_batch, HourLocks};
use crate::models::{HourlyBatch, PracticePiece, Sample};
use crate::report::DailyReport;
use crate::store::EventStore;
use crate::timeline::{self, day_window, hours_in_window, Reconstruction};
use crate::{log_debug, log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Clone)]
pub struct UsageEngine<S> {
    store: S,
    config: EngineConfig,
    registry: ClassifierRegistry,
    locks: HourLocks,
}

impl<S: EventStore> UsageEngine<S> {
    /// Fails fast on an invalid configuration or project pattern.
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let registry = ClassifierRegistry::from_config(&config)?;

        Ok(Self {
            store,
            config,
            registry,
            locks: HourLocks::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merge `samples` into their hourly batches, one hour at a time.
    ///
    /// Samples with an empty hostname adopt `hostname`. Hours are written in
    /// ascending order; when one fails, earlier hours stay written and the
    /// error names the failing hour.
    pub async fn ingest(&self, hostname: &str, samples: Vec<Sample>) -> Result<()> {
        let samples: Vec<Sample> = samples
            .into_iter()
            .map(|mut sample| {
                if sample.hostname.is_empty() {
                    sample.hostname = hostname.to_string();
                }
                sample
            })
            .collect();

        for (hour, fresh) in group_by_hour(samples) {
            let _guard = self.locks.lock(hour).await;

            let stored = self
                .store
                .get(hour)
                .await
                .map_err(|err| UsageError::store_read(hour, err))?;
            let before = stored.as_ref().map(HourlyBatch::len).unwrap_or(0);
            let incoming = fresh.len();

            let merged = merge_batch(hour, stored, fresh);
            if let Err(err) = self.store.put(&merged).await {
                log_warn!("Ingest for {hostname} stopped at hour {hour}: {err:#}");
                return Err(UsageError::store_write(hour, err));
            }

            log_debug!(
                "hour {hour}: {before} stored + {incoming} incoming -> {} samples",
                merged.len()
            );
        }

        Ok(())
    }

    /// Reconstruct the samples in `[start, end)`, reading every hourly batch
    /// that overlaps the window.
    pub async fn reconstruct(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Reconstruction> {
        let mut batches = Vec::new();
        for hour in hours_in_window(start, end) {
            if let Some(batch) = self
                .store
                .get(hour)
                .await
                .map_err(|err| UsageError::store_read(hour, err))?
            {
                if !batch.is_empty() {
                    batches.push(batch);
                }
            }
        }

        let pieces = self
            .store
            .pieces_between(start, end)
            .await
            .map_err(|err| UsageError::store("pieces_between", err))?;

        let tree = UsageTree::with_registry(self.registry.clone(), &self.config);
        timeline::reconstruct(&batches, &pieces, start, end, &self.config, tree)
    }

    /// The `limit` most recent batches, newest first, samples in capture order.
    pub async fn recent(&self, limit: usize) -> Result<Vec<HourlyBatch>> {
        let batches = self
            .store
            .latest(limit)
            .await
            .map_err(|err| UsageError::store("latest", err))?;

        Ok(batches
            .into_iter()
            .map(|batch| HourlyBatch {
                samples: batch.sorted_samples(),
                hour: batch.hour,
            })
            .collect())
    }

    pub async fn record_piece(&self, piece: &PracticePiece) -> Result<()> {
        self.store
            .put_piece(piece)
            .await
            .map_err(|err| UsageError::store("put_piece", err))?;
        log_info!(
            "Recorded practice piece at {} ({} notes, {}ms)",
            piece.started_at,
            piece.notes.len(),
            piece.length_ms
        );
        Ok(())
    }

    /// Report for the calendar day `date` at the configured UTC offset.
    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport> {
        let (start, end) = day_window(date, self.config.utc_offset());
        let reconstruction = self.reconstruct(start, end).await?;
        Ok(DailyReport::new(date, start, reconstruction))
    }
}
