//! Adapters for bucket definition sources.

pub mod fs;
pub mod memory;
