#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::sync::{Arc, Mutex};

use microblog_proto::{Message, MessageId};

use super::FeedStore;
use crate::error::TransportError;

/// A call made against a [`MemoryFeed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRequest {
    /// `latest(count)`
    Latest {
        /// Requested count
        count: usize,
    },
    /// `page(limit, next)`
    Page {
        /// Requested page size
        limit: usize,
        /// Highest id requested
        next: MessageId,
    },
    /// `publish(..)`
    Publish,
}

/// In-process feed store for tests and simulation.
///
/// Ids are assigned from 1 in append order. Clones share the same log.
/// Every call is recorded so tests can assert on the exact request
/// sequence.
///
/// # Panics
///
/// Methods panic if the internal mutex is poisoned (a thread panicked while
/// holding the lock). Acceptable for test/simulation code.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Stored messages, index `i` holds id `i + 1`
    messages: Vec<Message>,
    requests: Vec<FeedRequest>,
}

impl MemoryFeed {
    /// Empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` as-is, without recording a request.
    ///
    /// Any id on `message` is replaced. Used to seed feeds, including with
    /// messages a real store would refuse.
    #[allow(clippy::expect_used)]
    pub fn insert_raw(&self, message: Message) -> MessageId {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.append(message).id.unwrap_or_default()
    }

    /// Number of stored messages.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").messages.len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests made so far, oldest first.
    #[allow(clippy::expect_used)]
    pub fn requests(&self) -> Vec<FeedRequest> {
        self.inner.lock().expect("Mutex poisoned").requests.clone()
    }

    /// Number of `page` calls made so far.
    pub fn page_requests(&self) -> usize {
        self.requests().iter().filter(|r| matches!(r, FeedRequest::Page { .. })).count()
    }
}

impl Inner {
    fn append(&mut self, mut message: Message) -> Message {
        message.id = Some(self.messages.len() as MessageId + 1);
        self.messages.push(message.clone());
        message
    }

    /// Messages with id ≤ `next`, newest first, at most `limit`.
    fn newest_first(&self, next: MessageId, limit: usize) -> Vec<Message> {
        let upto = usize::try_from(next).unwrap_or(usize::MAX).min(self.messages.len());
        self.messages[..upto].iter().rev().take(limit).cloned().collect()
    }
}

impl FeedStore for MemoryFeed {
    #[allow(clippy::expect_used)]
    fn latest(&self, count: usize) -> Result<Vec<Message>, TransportError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.requests.push(FeedRequest::Latest { count });
        Ok(inner.newest_first(MessageId::MAX, count))
    }

    #[allow(clippy::expect_used)]
    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, TransportError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.requests.push(FeedRequest::Page { limit, next });
        Ok(inner.newest_first(next, limit))
    }

    #[allow(clippy::expect_used)]
    fn publish(&self, message: &Message) -> Result<Message, TransportError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        inner.requests.push(FeedRequest::Publish);
        Ok(inner.append(message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(n: usize) -> MemoryFeed {
        let feed = MemoryFeed::new();
        for i in 1..=n {
            feed.insert_raw(Message::new("2024-01-01T00:00:00Z", "alice", format!("m{i}"), None));
        }
        feed
    }

    fn ids(messages: &[Message]) -> Vec<MessageId> {
        messages.iter().filter_map(|m| m.id).collect()
    }

    #[test]
    fn ids_start_at_one() {
        let feed = MemoryFeed::new();
        let stored = feed.publish(&Message::new("d", "alice", "hi", None)).unwrap();
        assert_eq!(stored.id, Some(1));
        assert_eq!(feed.requests(), [FeedRequest::Publish]);
    }

    #[test]
    fn latest_is_newest_first() {
        let feed = seeded(5);
        assert_eq!(ids(&feed.latest(3).unwrap()), [5, 4, 3]);
        assert_eq!(ids(&feed.latest(10).unwrap()), [5, 4, 3, 2, 1]);
    }

    #[test]
    fn page_respects_next_and_limit() {
        let feed = seeded(5);
        assert_eq!(ids(&feed.page(2, 4).unwrap()), [4, 3]);
        assert_eq!(ids(&feed.page(10, 2).unwrap()), [2, 1]);
        assert!(feed.page(3, 0).unwrap().is_empty());
        assert_eq!(ids(&feed.page(2, 100).unwrap()), [5, 4]);
    }

    #[test]
    fn empty_feed_lists_nothing() {
        let feed = MemoryFeed::new();
        assert!(feed.latest(1).unwrap().is_empty());
        assert!(feed.is_empty());
    }

    #[test]
    fn clones_share_the_log() {
        let feed = MemoryFeed::new();
        let clone = feed.clone();
        clone.insert_raw(Message::new("d", "alice", "hi", None));
        assert_eq!(feed.len(), 1);
    }
}
