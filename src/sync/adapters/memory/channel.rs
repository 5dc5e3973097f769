//! In-process change event source backed by a `tokio::sync::mpsc` channel.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::sync::{
    domain::{ChangeEvent, SourceTable},
    ports::ChangeEventSource,
};

/// Default buffer capacity for a table subscription.
const DEFAULT_CAPACITY: usize = 1024;

/// Returned when publishing to a subscription whose receiver is gone.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0} subscription closed")]
pub struct SubscriptionClosed(pub SourceTable);

/// Publishing half of an in-process table subscription.
#[derive(Debug, Clone)]
pub struct ChangeEventSender {
    table: SourceTable,
    sender: mpsc::Sender<ChangeEvent>,
}

impl ChangeEventSender {
    /// Publishes an event, waiting while the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionClosed`] when the receiving source was dropped.
    pub async fn publish(&self, event: ChangeEvent) -> Result<(), SubscriptionClosed> {
        self.sender
            .send(event)
            .await
            .map_err(|_| SubscriptionClosed(self.table))
    }
}

/// Receiving half of an in-process table subscription.
///
/// # Usage
///
/// ```rust
/// use atelier::sync::adapters::memory::ChannelEventSource;
/// use atelier::sync::domain::SourceTable;
/// use atelier::sync::ports::ChangeEventSource;
///
/// let (_sender, source) = ChannelEventSource::channel(SourceTable::Leads);
/// assert_eq!(source.table(), SourceTable::Leads);
/// ```
#[derive(Debug)]
pub struct ChannelEventSource {
    table: SourceTable,
    receiver: mpsc::Receiver<ChangeEvent>,
}

impl ChannelEventSource {
    /// Creates a subscription with the default buffer capacity.
    #[must_use]
    pub fn channel(table: SourceTable) -> (ChangeEventSender, Self) {
        Self::with_capacity(table, DEFAULT_CAPACITY)
    }

    /// Creates a subscription with a specific buffer capacity.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(table: SourceTable, capacity: usize) -> (ChangeEventSender, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            ChangeEventSender { table, sender },
            Self { table, receiver },
        )
    }
}

#[async_trait]
impl ChangeEventSource for ChannelEventSource {
    fn table(&self) -> SourceTable {
        self.table
    }

    async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }
}
