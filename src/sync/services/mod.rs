//! Application services keeping the live task collection current.

mod config;
mod reconciler;
mod store;

pub use config::{DEFAULT_FETCH_TIMEOUT, ReconcilerConfig};
pub use reconciler::{ReconcileOutcome, Reconciler, ResyncError, StaleReason, TaskChange};
pub use store::{StoreWrite, TaskStore};
