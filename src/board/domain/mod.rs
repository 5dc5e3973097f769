//! Domain model for board classification.
//!
//! Buckets are declared as data, parsed into typed predicate rules, and
//! validated together as a [`RuleSet`] before any task is classified.

mod bucket;
mod error;
mod ids;
mod rule;
mod rule_set;

pub use bucket::{Bucket, BucketDefinition};
pub use error::BucketConfigError;
pub use ids::BucketId;
pub use rule::{FieldPath, Literal, Operator, OperatorKind, PredicateRule, RuleDefinition};
pub use rule_set::RuleSet;
