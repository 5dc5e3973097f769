//! Change event source port.

use crate::sync::domain::{ChangeEvent, SourceTable};
use async_trait::async_trait;

/// One push-based subscription to a monitored table.
///
/// The transport (push, poll, queue consumer) is up to the adapter; the
/// reconciler only needs at-least-once delivery in arrival order.
#[async_trait]
pub trait ChangeEventSource: Send {
    /// Returns the table this subscription monitors.
    fn table(&self) -> SourceTable;

    /// Waits for the next event.
    ///
    /// Returns `None` once the subscription has closed.
    async fn next_event(&mut self) -> Option<ChangeEvent>;
}

#[async_trait]
impl<S> ChangeEventSource for Box<S>
where
    S: ChangeEventSource + ?Sized,
{
    fn table(&self) -> SourceTable {
        (**self).table()
    }

    async fn next_event(&mut self) -> Option<ChangeEvent> {
        (**self).next_event().await
    }
}
