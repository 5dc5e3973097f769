//! Port for loading bucket definitions.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::board::domain::BucketDefinition;

/// Result type for bucket definition sources.
pub type BucketSourceResult<T> = Result<T, BucketSourceError>;

/// Supplies the current bucket configuration.
///
/// Sources are read on initial load and on every explicit reload; they are
/// never polled.
#[async_trait]
pub trait BucketDefinitionSource: Send + Sync {
    /// Returns the bucket definitions in declared order.
    ///
    /// # Errors
    ///
    /// Returns [`BucketSourceError`] when the definitions cannot be read or
    /// decoded.
    async fn load(&self) -> BucketSourceResult<Vec<BucketDefinition>>;
}

/// Errors returned by bucket definition sources.
#[derive(Debug, Clone, Error)]
pub enum BucketSourceError {
    /// The backing storage could not be read.
    #[error("failed to read bucket definitions from {location}: {cause}")]
    Read {
        /// Where the definitions were expected.
        location: String,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The definitions are not valid JSON of the expected shape.
    #[error("failed to decode bucket definitions from {location}: {cause}")]
    Decode {
        /// Where the definitions came from.
        location: String,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl BucketSourceError {
    /// Wraps a read failure.
    pub fn read(
        location: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Read {
            location: location.into(),
            cause: Arc::new(err),
        }
    }

    /// Wraps a decode failure.
    pub fn decode(
        location: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Decode {
            location: location.into(),
            cause: Arc::new(err),
        }
    }
}
