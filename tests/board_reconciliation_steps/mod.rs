//! Step definitions for board reconciliation scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
