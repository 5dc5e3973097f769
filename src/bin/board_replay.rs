//! Replays recorded change events against an in-memory board.
//!
//! Usage:
//!
//! ```text
//! board_replay --buckets <file> --tasks <file> [--events <file>]
//! ```
//!
//! `--buckets` is a JSON array of bucket definitions and `--tasks` a JSON
//! array of task rows seeding the in-memory system of record. `--events` is
//! a JSON-lines file; each line is either a change event or a row mutation
//! applied to the system of record before the following events:
//!
//! ```json
//! {"fetcher": {"put": {"id": "6f1c2d9e-6a43-4d7b-9a57-1f0f3f4a2b10", "status": "approved"}}}
//! {"source_table": "tasks", "operation": "update", "new_payload": {"id": "6f1c2d9e-6a43-4d7b-9a57-1f0f3f4a2b10"}}
//! ```
//!
//! Bucket counts are printed to stdout as JSON. Set `RUST_LOG` to see the
//! reconciliation log on stderr.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use atelier::board::{
    adapters::fs::{JsonFileBucketDefinitions, read_utf8_file},
    domain::BucketId,
    services::{BoardError, TaskBoard},
};
use atelier::sync::{
    domain::ChangeEvent,
    services::{ReconcileOutcome, Reconciler, ReconcilerConfig, ResyncError, TaskStore},
};
use atelier::task::{
    adapters::memory::InMemoryTaskFetcher,
    domain::{Task, TaskId},
    ports::FetchError,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use mockable::DefaultClock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "board_replay", version, about = "Replay change events against a task board")]
struct Args {
    /// JSON array of bucket definitions.
    #[arg(long, env = "ATELIER_BUCKETS")]
    buckets: Utf8PathBuf,

    /// JSON array of task rows seeding the system of record.
    #[arg(long)]
    tasks: Utf8PathBuf,

    /// JSON-lines file of change events and row mutations.
    #[arg(long)]
    events: Option<Utf8PathBuf>,

    /// Seconds to wait for a single fetch.
    #[arg(long, env = "ATELIER_FETCH_TIMEOUT_SECS", default_value_t = 10)]
    fetch_timeout_secs: u64,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {path} line {line}: {source}")]
    Decode {
        path: Utf8PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Resync(#[from] ResyncError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

/// Mutation of the in-memory system of record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RowMutation {
    Put(Task),
    Remove(TaskId),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Fetcher { fetcher: RowMutation },
    Event(ChangeEvent),
}

#[derive(Debug, Default, Serialize)]
struct ReplayReport {
    counts: BTreeMap<BucketId, usize>,
    unclassified: usize,
    events: usize,
    malformed: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let report = replay(&args).await?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)
        .map_err(|err| ReplayError::Output(err.into()))?;
    writeln!(stdout).map_err(ReplayError::Output)?;
    Ok(())
}

async fn replay(args: &Args) -> Result<ReplayReport, ReplayError> {
    let rows: Vec<Task> = decode(&args.tasks, 0, &read(&args.tasks)?)?;
    let fetcher = InMemoryTaskFetcher::with_tasks(rows);
    let store = Arc::new(TaskStore::new());
    let config = ReconcilerConfig::default()
        .with_fetch_timeout(Duration::from_secs(args.fetch_timeout_secs));
    let reconciler = Reconciler::new(Arc::new(fetcher.clone()), Arc::clone(&store), config);
    let board = TaskBoard::load(
        Arc::clone(&store),
        &JsonFileBucketDefinitions::new(args.buckets.clone()),
        Arc::new(DefaultClock),
    )
    .await?;
    reconciler.resync().await?;

    let mut report = ReplayReport::default();
    if let Some(path) = args.events.as_deref() {
        let contents = read(path)?;
        for (index, raw) in contents.lines().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            match decode(path, index + 1, raw)? {
                ReplayLine::Fetcher {
                    fetcher: RowMutation::Put(task),
                } => fetcher.put(task)?,
                ReplayLine::Fetcher {
                    fetcher: RowMutation::Remove(task_id),
                } => {
                    fetcher.remove(task_id)?;
                }
                ReplayLine::Event(event) => {
                    report.events += 1;
                    let outcome = reconciler.handle_event(&event).await;
                    tracing::debug!(line = index + 1, ?outcome, "Replayed change event");
                    if matches!(outcome, ReconcileOutcome::Malformed(_)) {
                        report.malformed += 1;
                    }
                }
            }
        }
    }

    let view = board.view();
    report.counts = view.bucket_counts();
    report.unclassified = view.unclassified().len();
    Ok(report)
}

fn read(path: &Utf8Path) -> Result<String, ReplayError> {
    read_utf8_file(path).map_err(|source| ReplayError::Read {
        path: path.to_owned(),
        source,
    })
}

fn decode<T>(path: &Utf8Path, line: usize, raw: &str) -> Result<T, ReplayError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_str(raw).map_err(|source| ReplayError::Decode {
        path: path.to_owned(),
        line,
        source,
    })
}
