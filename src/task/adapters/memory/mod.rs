//! In-memory adapters for the task ports.

mod fetcher;

pub use fetcher::InMemoryTaskFetcher;
