//! Error types for task domain parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is not a UUID.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// The lead identifier is not a UUID.
    #[error("invalid lead identifier '{0}'")]
    InvalidLeadId(String),
}

/// Error returned while parsing task statuses from external payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
