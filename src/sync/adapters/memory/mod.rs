//! In-memory adapters for the sync ports.

mod channel;

pub use channel::{ChangeEventSender, ChannelEventSource, SubscriptionClosed};
