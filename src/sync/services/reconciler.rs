//! Merges change notifications from every source into the task store.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};

use super::{ReconcilerConfig, StoreWrite, TaskStore};
use crate::sync::{
    domain::{ChangeEvent, EventError, EventTarget},
    ports::ChangeEventSource,
};
use crate::task::{
    domain::{LeadId, Task, TaskId},
    ports::{FetchError, TaskFetcher},
};

/// Why a task was left untouched after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// The fetch did not finish within the configured timeout.
    TimedOut,
    /// The fetch failed.
    FetchFailed(String),
}

/// Per-task effect of a reconciled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    /// A fetched copy was written to the store.
    Stored {
        /// Reconciled task.
        task_id: TaskId,
        /// What the store did with the copy.
        write: StoreWrite,
    },
    /// The task was deleted, soft-deleted, or no longer found.
    Removed {
        /// Reconciled task.
        task_id: TaskId,
        /// What the store did on removal.
        write: StoreWrite,
    },
    /// The focused copy was refreshed from a side-channel event.
    FocusRefreshed(TaskId),
    /// The store kept its previous copy.
    Stale {
        /// Reconciled task.
        task_id: TaskId,
        /// Why the fetch produced nothing usable.
        reason: StaleReason,
    },
}

/// Result of handling one change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The event affected these tasks.
    Applied(Vec<TaskChange>),
    /// The event does not concern any tracked task.
    Ignored,
    /// The event carried no usable identifier and was dropped.
    Malformed(EventError),
}

/// Errors returned by a full resynchronisation.
#[derive(Debug, Clone, Error)]
pub enum ResyncError {
    /// The fetcher failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The fetcher did not answer within the timeout.
    #[error("full task fetch timed out after {0:?}")]
    TimedOut(Duration),
}

/// Keeps a [`TaskStore`] in line with external mutations.
///
/// Each event is mapped to the affected task ids, the tasks are re-read
/// through the [`TaskFetcher`], and the stored copies are replaced wholesale.
/// Failed or timed-out fetches leave the stored copy in place; the next event
/// for the same task, or [`refresh`](Self::refresh), corrects it.
pub struct Reconciler<F>
where
    F: TaskFetcher,
{
    fetcher: Arc<F>,
    store: Arc<TaskStore>,
    config: ReconcilerConfig,
}

impl<F> Reconciler<F>
where
    F: TaskFetcher,
{
    /// Creates a reconciler writing into `store`.
    #[must_use]
    pub const fn new(fetcher: Arc<F>, store: Arc<TaskStore>, config: ReconcilerConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    /// Returns the store this reconciler maintains.
    #[must_use]
    pub const fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Applies one change notification to the store.
    pub async fn handle_event(&self, event: &ChangeEvent) -> ReconcileOutcome {
        let target = match event.target() {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    source_table = %event.source_table(),
                    operation = %event.operation(),
                    "Dropping change event without a usable identifier"
                );
                return ReconcileOutcome::Malformed(err);
            }
        };

        match target {
            EventTarget::Remove(task_id) => {
                let write = self.store.remove(task_id);
                tracing::debug!(%task_id, ?write, "Removed deleted task");
                ReconcileOutcome::Applied(vec![TaskChange::Removed { task_id, write }])
            }
            EventTarget::Refetch(task_id) => {
                ReconcileOutcome::Applied(vec![self.reconcile(task_id).await])
            }
            EventTarget::Lead(lead_id) => self.reconcile_lead(lead_id).await,
            EventTarget::FocusRefresh(task_id) => self.refresh_focused(task_id).await,
        }
    }

    /// Re-reads one task and replaces its stored copy.
    ///
    /// This is the manual refresh path for a task whose copy went stale.
    pub async fn refresh(&self, task_id: TaskId) -> TaskChange {
        self.reconcile(task_id).await
    }

    /// Replaces the whole store with a fresh read of every live task.
    ///
    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ResyncError`] when the fetch fails or times out; the store is
    /// left unchanged in that case.
    pub async fn resync(&self) -> Result<usize, ResyncError> {
        let timeout = self.config.fetch_timeout();
        let tasks = tokio::time::timeout(timeout, self.fetcher.fetch_active())
            .await
            .map_err(|_| ResyncError::TimedOut(timeout))??;
        self.store.replace_all(tasks);
        let stored = self.store.len();
        tracing::info!(stored, "Resynchronised task store");
        Ok(stored)
    }

    async fn reconcile(&self, task_id: TaskId) -> TaskChange {
        match self.fetch(task_id).await {
            Ok(Some(task)) if !task.is_deleted() => {
                let write = self.store.replace(task);
                tracing::debug!(%task_id, ?write, "Stored fetched task");
                TaskChange::Stored { task_id, write }
            }
            Ok(_) => {
                let write = self.store.remove(task_id);
                tracing::debug!(%task_id, ?write, "Fetched task is gone, removing it");
                TaskChange::Removed { task_id, write }
            }
            Err(reason) => TaskChange::Stale { task_id, reason },
        }
    }

    async fn reconcile_lead(&self, lead_id: LeadId) -> ReconcileOutcome {
        let task_ids = self.store.task_ids_for_lead(lead_id);
        if task_ids.is_empty() {
            tracing::debug!(%lead_id, "Lead change does not concern any stored task");
            return ReconcileOutcome::Ignored;
        }

        let mut changes = Vec::with_capacity(task_ids.len());
        for task_id in task_ids {
            changes.push(self.reconcile(task_id).await);
        }
        ReconcileOutcome::Applied(changes)
    }

    async fn refresh_focused(&self, task_id: TaskId) -> ReconcileOutcome {
        if self.store.focused_id() != Some(task_id) {
            return ReconcileOutcome::Ignored;
        }

        let change = match self.fetch(task_id).await {
            Ok(Some(task)) => {
                let deleted = task.is_deleted();
                if !self.store.refresh_focused(task) {
                    // Focus moved elsewhere while the fetch was in flight.
                    return ReconcileOutcome::Ignored;
                }
                if deleted {
                    TaskChange::Removed {
                        task_id,
                        write: StoreWrite::Removed,
                    }
                } else {
                    TaskChange::FocusRefreshed(task_id)
                }
            }
            Ok(None) => TaskChange::Removed {
                task_id,
                write: self.store.remove(task_id),
            },
            Err(reason) => TaskChange::Stale { task_id, reason },
        };
        ReconcileOutcome::Applied(vec![change])
    }

    async fn fetch(&self, task_id: TaskId) -> Result<Option<Task>, StaleReason> {
        let timeout = self.config.fetch_timeout();
        match tokio::time::timeout(timeout, self.fetcher.fetch(task_id)).await {
            Ok(Ok(task)) => Ok(task),
            Ok(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    %task_id,
                    "Task fetch failed, keeping previous copy"
                );
                Err(StaleReason::FetchFailed(err.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    %task_id,
                    ?timeout,
                    "Task fetch timed out, dropping event"
                );
                Err(StaleReason::TimedOut)
            }
        }
    }

    /// Processes every event of one source in arrival order.
    ///
    /// Returns the number of events handled once the source closes.
    pub async fn drain<S>(&self, mut source: S) -> usize
    where
        S: ChangeEventSource,
    {
        let table = source.table();
        let mut handled = 0_usize;
        while let Some(event) = source.next_event().await {
            self.handle_event(&event).await;
            handled += 1;
        }
        tracing::info!(source_table = %table, handled, "Change event source closed");
        handled
    }
}

impl<F> Reconciler<F>
where
    F: TaskFetcher + 'static,
{
    /// Drains `source` on its own task.
    ///
    /// Events of one source are handled one at a time; separate sources run
    /// concurrently and meet only at the store's atomic replace.
    pub fn spawn_source<S>(self: &Arc<Self>, source: S) -> JoinHandle<usize>
    where
        S: ChangeEventSource + 'static,
    {
        let reconciler = Arc::clone(self);
        tokio::spawn(async move { reconciler.drain(source).await })
    }

    /// Drains all sources concurrently until every one of them closes.
    ///
    /// Returns the total number of events handled.
    pub async fn run<S>(self: Arc<Self>, sources: impl IntoIterator<Item = S>) -> usize
    where
        S: ChangeEventSource + 'static,
    {
        let mut workers = JoinSet::new();
        for source in sources {
            let reconciler = Arc::clone(&self);
            workers.spawn(async move { reconciler.drain(source).await });
        }

        let mut handled = 0_usize;
        while let Some(result) = workers.join_next().await {
            match result {
                Ok(count) => handled += count,
                Err(err) => tracing::error!(error = %err, "Change event worker failed"),
            }
        }
        handled
    }
}
