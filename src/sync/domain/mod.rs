//! Domain model for change notifications.
//!
//! Events arrive from independent table subscriptions. The domain maps each
//! one to the task entity it affects; fetching and storing stay in the
//! services layer.

mod error;
mod event;

pub use error::EventError;
pub use event::{ChangeEvent, ChangeOperation, EventTarget, SourceTable};
