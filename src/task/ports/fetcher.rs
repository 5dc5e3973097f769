//! Entity fetcher port: full denormalized reads of design tasks.

use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for entity fetcher operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Denormalized task read contract.
///
/// Implementations join the task row with its customer, campaign, lead, and
/// layout rows and return one canonical [`Task`]. Reads are stateless and
/// idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskFetcher: Send + Sync {
    /// Reads one task by identifier.
    ///
    /// Returns `Ok(None)` when the task no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the backing store cannot be read.
    async fn fetch(&self, task_id: TaskId) -> FetchResult<Option<Task>>;

    /// Reads every task that is not soft-deleted.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the backing store cannot be read.
    async fn fetch_active(&self) -> FetchResult<Vec<Task>>;
}

/// Errors returned by entity fetcher implementations.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The backing store could not be reached.
    #[error("task source unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Wraps a transport or query error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
