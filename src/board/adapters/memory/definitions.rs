//! Bucket definitions held in memory, replaceable at runtime.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::board::{
    domain::BucketDefinition,
    ports::{BucketDefinitionSource, BucketSourceError, BucketSourceResult},
};

/// Thread-safe in-memory definition source.
///
/// Clones share the same definitions, so a test can hold one handle to swap
/// the configuration while the board reloads from another.
#[derive(Debug, Clone, Default)]
pub struct StaticBucketDefinitions {
    definitions: Arc<RwLock<Vec<BucketDefinition>>>,
}

impl StaticBucketDefinitions {
    /// Creates a source returning `definitions`.
    #[must_use]
    pub fn new(definitions: Vec<BucketDefinition>) -> Self {
        Self {
            definitions: Arc::new(RwLock::new(definitions)),
        }
    }

    /// Replaces the definitions returned by subsequent loads.
    ///
    /// # Errors
    ///
    /// Returns [`BucketSourceError::Read`] when the lock is poisoned.
    pub fn replace(&self, definitions: Vec<BucketDefinition>) -> BucketSourceResult<()> {
        let mut guard = self
            .definitions
            .write()
            .map_err(|e| BucketSourceError::read("memory", std::io::Error::other(e.to_string())))?;
        *guard = definitions;
        Ok(())
    }
}

#[async_trait]
impl BucketDefinitionSource for StaticBucketDefinitions {
    async fn load(&self) -> BucketSourceResult<Vec<BucketDefinition>> {
        let guard = self
            .definitions
            .read()
            .map_err(|e| BucketSourceError::read("memory", std::io::Error::other(e.to_string())))?;
        Ok(guard.clone())
    }
}
