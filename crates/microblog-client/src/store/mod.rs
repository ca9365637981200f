//! Feed store boundary.
//!
//! The client never talks to a concrete server directly. Publishing and
//! walking go through [`FeedStore`], an append-only log that assigns ids and
//! lists messages newest first.
//!
//! The trait is synchronous: every client operation is a short, strictly
//! sequential exchange, so there is nothing to overlap.

#[cfg(feature = "http")]
mod http;
mod memory;

#[cfg(feature = "http")]
pub use http::HttpFeedStore;
pub use memory::{FeedRequest, MemoryFeed};
use microblog_proto::{Message, MessageId};

use crate::error::TransportError;

/// Append-only message log.
///
/// # Ordering Contract
///
/// Listing operations return messages with strictly descending ids. The
/// feed walker checks this and treats violations as protocol errors.
pub trait FeedStore {
    /// The `count` most recent messages, newest first.
    fn latest(&self, count: usize) -> Result<Vec<Message>, TransportError>;

    /// Up to `limit` messages with id ≤ `next`, newest first.
    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, TransportError>;

    /// Append a signed message. Returns the stored message with its
    /// assigned id.
    fn publish(&self, message: &Message) -> Result<Message, TransportError>;
}

impl<S: FeedStore + ?Sized> FeedStore for &S {
    fn latest(&self, count: usize) -> Result<Vec<Message>, TransportError> {
        (**self).latest(count)
    }

    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, TransportError> {
        (**self).page(limit, next)
    }

    fn publish(&self, message: &Message) -> Result<Message, TransportError> {
        (**self).publish(message)
    }
}
