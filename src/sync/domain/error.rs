//! Error types for change notification parsing.

use super::SourceTable;
use crate::task::domain::TaskDomainError;
use thiserror::Error;

/// Errors returned while resolving the target of a change notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// Neither payload snapshot carries the identifier key.
    #[error("{source_table} event carries no '{key}' in its payloads")]
    MissingIdentifier {
        /// Table the event came from.
        source_table: SourceTable,
        /// Payload key that was looked up.
        key: &'static str,
    },

    /// The identifier is present but malformed.
    #[error(transparent)]
    InvalidIdentifier(#[from] TaskDomainError),
}
