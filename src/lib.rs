//! Reconstructs per-host usage sessions from periodically sampled focus
//! events and summarizes them into a category tree and a timeline.

pub mod categorize;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod report;
pub mod store;
pub mod timeline;
pub mod utils;

pub use categorize::{CategoryNode, Classifier, UsageTree};
pub use config::EngineConfig;
pub use db::Database;
pub use engine::UsageEngine;
pub use error::UsageError;
pub use models::{HourlyBatch, Interval, PracticePiece, Sample, Timeline};
pub use report::DailyReport;
pub use store::{EventStore, MemoryStore};
pub use timeline::Reconstruction;
pub use utils::init_logging;
