use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per hour key, serializing read-modify-write of a batch.
#[derive(Clone, Default)]
pub struct HourLocks {
    inner: Arc<Mutex<HashMap<DateTime<Utc>, Arc<AsyncMutex<()>>>>>,
}

impl HourLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other ingest holds `hour`.
    pub async fn lock(&self, hour: DateTime<Utc>) -> HourGuard {
        let slot = {
            let mut guard = match self.inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(guard.entry(hour).or_default())
        };

        HourGuard {
            hour,
            locks: self.clone(),
            guard: Some(slot.lock_owned().await),
        }
    }

    pub fn tracked_hours(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn release(&self, hour: DateTime<Utc>) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Drop the slot once nobody else is queued on it.
        if let Some(slot) = guard.get(&hour) {
            if Arc::strong_count(slot) == 1 {
                guard.remove(&hour);
            }
        }
    }
}

pub struct HourGuard {
    hour: DateTime<Utc>,
    locks: HourLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for HourGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(self.hour);
    }
}
