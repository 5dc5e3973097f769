//! Live reconciliation of design tasks.
//!
//! Change notifications arrive from one subscription per monitored table
//! (tasks, layouts, leads, change requests). The [`services::Reconciler`]
//! maps each notification to the affected tasks, re-reads them through the
//! task fetcher port, and replaces their copies in the
//! [`services::TaskStore`]. The module follows hexagonal architecture:
//!
//! - Event types in [`domain`]
//! - Source contracts in [`ports`]
//! - In-process sources in [`adapters`]
//! - Store and reconciler in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
