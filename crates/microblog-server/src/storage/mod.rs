//! Storage abstraction for the feed.
//!
//! Trait-based abstraction over an append-only message log. The trait is
//! synchronous (no async): every operation is a single short transaction.

mod error;
mod memory;
mod redb;

pub use error::StorageError;
pub use memory::MemoryStorage;
use microblog_proto::{Message, MessageId};

pub use self::redb::RedbStorage;

/// Append-only message log.
///
/// Must be Clone (shared by every request handler), Send + Sync
/// (thread-safe), and synchronous. Implementations share internal state via
/// Arc, so clones access the same log.
///
/// # Invariants
///
/// - Ids are assigned from 1, strictly increasing, never reused
/// - Listing returns messages in strictly descending id order
pub trait Storage: Clone + Send + Sync + 'static {
    /// Append a message and assign it the next id.
    ///
    /// Any id already on `message` is ignored. Returns the stored message.
    fn append(&self, message: &Message) -> Result<Message, StorageError>;

    /// Highest assigned id. `None` if the log is empty.
    fn head(&self) -> Result<Option<MessageId>, StorageError>;

    /// Up to `limit` messages with id ≤ `next`, newest first.
    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, StorageError>;

    /// The `count` most recent messages, newest first. `None` returns the
    /// whole log.
    fn latest(&self, count: Option<usize>) -> Result<Vec<Message>, StorageError> {
        self.page(count.unwrap_or(usize::MAX), MessageId::MAX)
    }
}
