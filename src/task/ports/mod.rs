//! Port contracts for reading design tasks.
//!
//! Ports define infrastructure-agnostic interfaces used by the sync services.

pub mod fetcher;

pub use fetcher::{FetchError, FetchResult, TaskFetcher};
