//! Board facade combining the task store with the current rule set.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use mockable::Clock;
use thiserror::Error;

use super::{BucketView, BucketViewBuilder};
use crate::board::{
    domain::{BucketConfigError, BucketId, RuleSet},
    ports::{BucketDefinitionSource, BucketSourceError},
};
use crate::sync::services::TaskStore;
use crate::task::domain::Task;

/// Errors returned while loading the board configuration.
#[derive(Debug, Clone, Error)]
pub enum BoardError {
    /// The definitions could not be read.
    #[error(transparent)]
    Source(#[from] BucketSourceError),
    /// The definitions were read but are invalid.
    #[error(transparent)]
    Config(#[from] BucketConfigError),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Effect of an explicit reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The definitions are identical to the ones in force.
    Unchanged,
    /// A new rule set replaced the previous one.
    Replaced {
        /// Number of buckets in the new rule set.
        buckets: usize,
    },
}

/// Read side of the board.
///
/// Views are rebuilt from the current store snapshot on every call, so they
/// always reflect the latest reconciled state.
pub struct TaskBoard<C>
where
    C: Clock + Send + Sync,
{
    store: Arc<TaskStore>,
    rule_set: RwLock<Arc<RuleSet>>,
    builder: BucketViewBuilder<C>,
}

impl<C> TaskBoard<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a board with an already validated rule set.
    #[must_use]
    pub fn new(store: Arc<TaskStore>, rule_set: RuleSet, clock: Arc<C>) -> Self {
        Self {
            store,
            rule_set: RwLock::new(Arc::new(rule_set)),
            builder: BucketViewBuilder::new(clock),
        }
    }

    /// Loads the initial rule set from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the definitions cannot be read or fail
    /// validation.
    pub async fn load<S>(store: Arc<TaskStore>, source: &S, clock: Arc<C>) -> BoardResult<Self>
    where
        S: BucketDefinitionSource + ?Sized,
    {
        let rule_set = load_rule_set(source).await?;
        tracing::info!(
            buckets = rule_set.len(),
            fingerprint = %rule_set.fingerprint(),
            "Loaded bucket rule set"
        );
        Ok(Self::new(store, rule_set, clock))
    }

    /// Re-reads the definitions and swaps the rule set if they changed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the new definitions cannot be read or fail
    /// validation. The previous rule set stays in force.
    pub async fn reload<S>(&self, source: &S) -> BoardResult<ReloadOutcome>
    where
        S: BucketDefinitionSource + ?Sized,
    {
        let candidate = match load_rule_set(source).await {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Bucket reload failed, keeping previous rule set"
                );
                return Err(err);
            }
        };

        let mut current = self.rule_set.write().unwrap_or_else(PoisonError::into_inner);
        if current.fingerprint() == candidate.fingerprint() {
            return Ok(ReloadOutcome::Unchanged);
        }
        let buckets = candidate.len();
        tracing::info!(
            buckets,
            fingerprint = %candidate.fingerprint(),
            "Reloaded bucket rule set"
        );
        *current = Arc::new(candidate);
        Ok(ReloadOutcome::Replaced { buckets })
    }

    /// Returns the rule set in force.
    #[must_use]
    pub fn rule_set(&self) -> Arc<RuleSet> {
        Arc::clone(&self.rule_set.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Builds a view of the current store contents.
    #[must_use]
    pub fn view(&self) -> BucketView {
        self.builder.build(self.store.snapshot(), &self.rule_set())
    }

    /// Returns the current tasks of bucket `id`.
    #[must_use]
    pub fn tasks_for_bucket(&self, id: impl AsRef<str>) -> Vec<Task> {
        self.view().tasks_for_bucket(id).to_vec()
    }

    /// Returns the current count of every active bucket.
    #[must_use]
    pub fn bucket_counts(&self) -> BTreeMap<BucketId, usize> {
        self.view().bucket_counts()
    }
}

async fn load_rule_set<S>(source: &S) -> BoardResult<RuleSet>
where
    S: BucketDefinitionSource + ?Sized,
{
    let definitions = source.load().await?;
    Ok(RuleSet::new(&definitions)?)
}
