//! Shared world state for board reconciliation BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use atelier::{
    board::{
        adapters::memory::StaticBucketDefinitions,
        domain::{BucketDefinition, OperatorKind, RuleDefinition},
        services::{BoardError, TaskBoard},
    },
    sync::services::{ReconcileOutcome, Reconciler, ReconcilerConfig, TaskStore},
    task::{
        adapters::memory::InMemoryTaskFetcher,
        domain::{Task, TaskId},
        ports::{FetchResult, TaskFetcher},
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Fetch timeout used by scenarios; short so timeouts resolve quickly.
pub const SCENARIO_FETCH_TIMEOUT: Duration = Duration::from_millis(100);

/// In-memory system of record that can be told to stop answering.
#[derive(Clone, Default)]
pub struct ScenarioFetcher {
    pub rows: InMemoryTaskFetcher,
    stalled: Arc<AtomicBool>,
}

impl ScenarioFetcher {
    /// Makes every subsequent fetch hang past the scenario timeout.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    async fn wait_if_stalled(&self) {
        if self.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(SCENARIO_FETCH_TIMEOUT * 50).await;
        }
    }
}

#[async_trait]
impl TaskFetcher for ScenarioFetcher {
    async fn fetch(&self, task_id: TaskId) -> FetchResult<Option<Task>> {
        self.wait_if_stalled().await;
        self.rows.fetch(task_id).await
    }

    async fn fetch_active(&self) -> FetchResult<Vec<Task>> {
        self.wait_if_stalled().await;
        self.rows.fetch_active().await
    }
}

/// Scenario world for board reconciliation behaviour tests.
pub struct BoardWorld {
    pub fetcher: ScenarioFetcher,
    pub store: Arc<TaskStore>,
    pub reconciler: Reconciler<ScenarioFetcher>,
    pub definitions: Vec<BucketDefinition>,
    pub board: Option<TaskBoard<DefaultClock>>,
    pub load_error: Option<BoardError>,
    pub tasks: HashMap<String, TaskId>,
    pub last_outcome: Option<ReconcileOutcome>,
}

impl BoardWorld {
    /// Creates a world with an empty store and system of record.
    #[must_use]
    pub fn new() -> Self {
        let fetcher = ScenarioFetcher::default();
        let store = Arc::new(TaskStore::new());
        let reconciler = Reconciler::new(
            Arc::new(fetcher.clone()),
            Arc::clone(&store),
            ReconcilerConfig::default().with_fetch_timeout(SCENARIO_FETCH_TIMEOUT),
        );

        Self {
            fetcher,
            store,
            reconciler,
            definitions: Vec::new(),
            board: None,
            load_error: None,
            tasks: HashMap::new(),
            last_outcome: None,
        }
    }

    /// Loads a board from the current definitions.
    pub fn load_board(&mut self) {
        let source = StaticBucketDefinitions::new(self.definitions.clone());
        match run_async(TaskBoard::load(
            Arc::clone(&self.store),
            &source,
            Arc::new(DefaultClock),
        )) {
            Ok(board) => self.board = Some(board),
            Err(err) => self.load_error = Some(err),
        }
    }

    /// Returns the identifier registered under `label`.
    pub fn task_id(&self, label: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(label)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown task label {label}"))
    }

    /// Returns the system-of-record row registered under `label`.
    pub fn row(&self, label: &str) -> Result<Task, eyre::Report> {
        let task_id = self.task_id(label)?;
        run_async(self.fetcher.rows.fetch(task_id))?
            .ok_or_else(|| eyre::eyre!("no row for task {label}"))
    }

    /// Returns the loaded board.
    pub fn board(&self) -> Result<&TaskBoard<DefaultClock>, eyre::Report> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("board has not been loaded"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Buckets used by most scenarios: pending excludes logo work.
#[must_use]
pub fn standard_buckets() -> Vec<BucketDefinition> {
    let status = |id: &str, status: &str| {
        BucketDefinition::new(id).with_rule(
            RuleDefinition::new("status", OperatorKind::Equals).with_value(status),
        )
    };
    vec![
        status("pending", "pending").excluding("logo_needed"),
        BucketDefinition::new("logo_needed").with_rule(
            RuleDefinition::new("lead.needs_logo", OperatorKind::Equals).with_value("true"),
        ),
        status("approved", "approved"),
    ]
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
