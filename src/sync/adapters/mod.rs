//! Adapter implementations for the sync ports.

pub mod memory;
