//! Bucket definitions read from a JSON file.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};

use super::read_utf8_file;
use crate::board::{
    domain::BucketDefinition,
    ports::{BucketDefinitionSource, BucketSourceError, BucketSourceResult},
};

/// Reads a JSON array of bucket definitions on every load.
///
/// The file is re-read on each call, so editing it and reloading the board
/// picks up the change.
#[derive(Debug, Clone)]
pub struct JsonFileBucketDefinitions {
    path: Utf8PathBuf,
}

impl JsonFileBucketDefinitions {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the configured path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl BucketDefinitionSource for JsonFileBucketDefinitions {
    async fn load(&self) -> BucketSourceResult<Vec<BucketDefinition>> {
        let contents = read_utf8_file(&self.path)
            .map_err(|err| BucketSourceError::read(self.path.as_str(), err))?;
        let definitions: Vec<BucketDefinition> = serde_json::from_str(&contents)
            .map_err(|err| BucketSourceError::decode(self.path.as_str(), err))?;
        tracing::debug!(
            path = %self.path,
            buckets = definitions.len(),
            "Loaded bucket definitions"
        );
        Ok(definitions)
    }
}
