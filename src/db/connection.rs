use std::{
    path::Path,
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;
use crate::{log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

struct Worker {
    sender: Option<mpsc::Sender<DbTask>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if let Err(join_err) = handle.join() {
                log_error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

/// SQLite event store. One worker thread owns the connection; every task
/// runs there in submission order.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    /// Open (or create) the database at `path`, migrate it and start the
    /// worker thread.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = open_connection(path)?;

        let (sender, receiver) = mpsc::channel::<DbTask>();
        let handle = thread::Builder::new()
            .name("usage-timeline-db".into())
            .spawn(move || {
                let mut conn = conn;
                for task in receiver {
                    task(&mut conn);
                }
                log_info!("Database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        log_info!("Database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                sender: Some(sender),
                handle: Some(handle),
            }),
        })
    }

    /// Run `task` on the worker thread and await its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self
            .worker
            .sender
            .as_ref()
            .ok_or_else(|| anyhow!("database worker already stopped"))?;
        let (reply_tx, reply_rx) = oneshot::channel();

        sender
            .send(Box::new(move |conn| {
                if reply_tx.send(task(conn)).is_err() {
                    log_warn!("DB caller dropped before receiving result");
                }
            }))
            .map_err(|_| anyhow!("database worker is not accepting tasks"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker dropped the task"))?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create database directory {}", parent.display())
        })?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        log_warn!("Failed to enable WAL mode: {err}");
    }
    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}
