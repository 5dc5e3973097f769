//! Error types for bucket configuration.

use super::BucketId;
use thiserror::Error;

/// Errors returned while loading bucket definitions into a rule set.
///
/// Every variant is a configuration mistake that would otherwise surface as
/// silent misclassification, so loading fails instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BucketConfigError {
    /// A bucket identifier is blank.
    #[error("bucket identifier must not be empty")]
    EmptyBucketId,

    /// Two buckets share an identifier.
    #[error("duplicate bucket identifier: {0}")]
    DuplicateBucket(BucketId),

    /// An exclusion names a bucket that is not defined.
    #[error("bucket {bucket} excludes unknown bucket '{excluded}'")]
    UnknownExclusion {
        /// Declaring bucket.
        bucket: BucketId,
        /// Undefined bucket identifier.
        excluded: String,
    },

    /// A bucket excludes itself.
    #[error("bucket {0} excludes itself")]
    SelfExclusion(BucketId),

    /// Exclusions form a cycle.
    #[error("cyclic bucket exclusions: {}", join_ids(.cycle))]
    CyclicExclusion {
        /// Buckets along the cycle; the first one is repeated at the end.
        cycle: Vec<BucketId>,
    },

    /// A rule field path is empty or has an empty segment.
    #[error("bucket {bucket} has an invalid field path '{path}'")]
    InvalidFieldPath {
        /// Declaring bucket.
        bucket: BucketId,
        /// Offending path.
        path: String,
    },

    /// A value-taking operator has no value.
    #[error("bucket {bucket}: operator {operator} on '{path}' requires a value")]
    MissingRuleValue {
        /// Declaring bucket.
        bucket: BucketId,
        /// Operator name.
        operator: &'static str,
        /// Rule field path.
        path: String,
    },

    /// A numeric comparison has a value that is not a finite number.
    #[error("bucket {bucket}: comparison on '{path}' needs a number, got '{value}'")]
    NonNumericThreshold {
        /// Declaring bucket.
        bucket: BucketId,
        /// Rule field path.
        path: String,
        /// Offending value.
        value: String,
    },
}

fn join_ids(ids: &[BucketId]) -> String {
    ids.iter()
        .map(BucketId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
