//! Identifier type for board buckets.

use super::BucketConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a bucket (board column), unique within a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketId(String);

impl BucketId {
    /// Creates a validated bucket identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BucketConfigError::EmptyBucketId`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, BucketConfigError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(BucketConfigError::EmptyBucketId);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BucketId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
