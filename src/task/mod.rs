//! Design tasks as the board sees them.
//!
//! A task is read back whole from the system of record: the task row joined
//! with its customer, campaign, lead, and layouts. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - The fetcher port in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
