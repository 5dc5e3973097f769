//! Ports for the board context.

pub mod source;

pub use source::{BucketDefinitionSource, BucketSourceError, BucketSourceResult};
