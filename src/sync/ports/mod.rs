//! Port contracts for change notification delivery.

pub mod source;

pub use source::ChangeEventSource;
