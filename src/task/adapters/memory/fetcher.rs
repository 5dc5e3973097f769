//! In-memory entity fetcher for tests and offline replay.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId},
    ports::{FetchError, FetchResult, TaskFetcher},
};

/// Thread-safe in-memory task source.
///
/// Holds already-joined task rows. Writes model external mutations of the
/// durable store; reads behave like the production fetcher, returning
/// soft-deleted rows from [`TaskFetcher::fetch`] and filtering them from
/// [`TaskFetcher::fetch_active`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskFetcher {
    rows: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskFetcher {
    /// Creates an empty task source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a task source seeded with the given rows.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let rows = tasks.into_iter().map(|task| (task.id(), task)).collect();
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Inserts or overwrites a row.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unavailable`] when the row lock is poisoned.
    pub fn put(&self, task: Task) -> FetchResult<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|err| FetchError::unavailable(std::io::Error::other(err.to_string())))?;
        rows.insert(task.id(), task);
        Ok(())
    }

    /// Hard-deletes a row, returning it when present.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Unavailable`] when the row lock is poisoned.
    pub fn remove(&self, task_id: TaskId) -> FetchResult<Option<Task>> {
        let mut rows = self
            .rows
            .write()
            .map_err(|err| FetchError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(rows.remove(&task_id))
    }
}

#[async_trait]
impl TaskFetcher for InMemoryTaskFetcher {
    async fn fetch(&self, task_id: TaskId) -> FetchResult<Option<Task>> {
        let rows = self
            .rows
            .read()
            .map_err(|err| FetchError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(rows.get(&task_id).cloned())
    }

    async fn fetch_active(&self) -> FetchResult<Vec<Task>> {
        let rows = self
            .rows
            .read()
            .map_err(|err| FetchError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(rows
            .values()
            .filter(|task| !task.is_deleted())
            .cloned()
            .collect())
    }
}
