//! In-memory bucket definition source.

mod definitions;

pub use definitions::StaticBucketDefinitions;
