//! usage-timeline: command-line front end for the usage engine.
//!
//! ## Subcommands
//!
//! - `ingest`: merge a sampler payload into the hourly batches
//! - `practice`: store a MIDI recorder payload as a practice piece
//! - `report`: print the daily report for a date as JSON
//! - `list`: print the most recent hourly batches as JSON

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
};

use usage_timeline::{
    ingest::{parse_practice_payload, parse_usage_payload},
    init_logging,
    timeline::local_date,
    Database, EngineConfig, UsageEngine,
};

#[derive(Parser)]
#[command(name = "usage-timeline")]
#[command(about = "Reconstruct usage sessions from sampled focus events")]
#[command(version)]
struct Cli {
    /// SQLite database holding hourly batches and practice pieces
    #[arg(long, global = true, default_value = "usage-timeline.sqlite3")]
    db: PathBuf,

    /// JSON engine configuration; defaults apply when absent
    #[arg(long, global = true, default_value = "usage-timeline.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a sampler payload (JSON array of raw usage records)
    Ingest {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Hostname for records that carry none
        #[arg(long)]
        host: Option<String>,
    },

    /// Store a practice piece (JSON array of raw MIDI notes)
    Practice {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the daily report
    Report {
        /// Calendar date, YYYY-MM-DD; today at the configured offset if omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the most recent hourly batches
    List {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        log::error!("usage-timeline failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load(&cli.config)?;
    let database = Database::new(cli.db)?;
    let engine = UsageEngine::new(database, config)?;

    match cli.command {
        Commands::Ingest { file, host } => {
            let host = host.unwrap_or_else(|| engine.config().default_hostname.clone());
            let payload = read_payload(&file)?;
            let samples = parse_usage_payload(&payload, &host)
                .with_context(|| format!("Failed to parse sampler payload {}", file.display()))?;
            let count = samples.len();
            engine.ingest(&host, samples).await?;
            log::info!("Ingested {count} samples from {}", file.display());
        }
        Commands::Practice { file } => {
            let payload = read_payload(&file)?;
            let piece = parse_practice_payload(&payload)
                .with_context(|| format!("Failed to parse practice payload {}", file.display()))?;
            engine.record_piece(&piece).await?;
        }
        Commands::Report { date } => {
            let date =
                date.unwrap_or_else(|| local_date(Utc::now(), engine.config().utc_offset()));
            let report = engine.daily_report(date).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::List { limit } => {
            let batches = engine.recent(limit).await?;
            println!("{}", serde_json::to_string_pretty(&batches)?);
        }
    }

    Ok(())
}

fn read_payload(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
