#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::sync::{Arc, Mutex};

use microblog_proto::{Message, MessageId};

use super::{Storage, StorageError};

/// In-memory storage implementation for testing and development
///
/// Messages live in a Vec in id order (index `i` holds id `i + 1`), wrapped
/// in Arc<Mutex<>> to allow Clone and concurrent access. Uses
/// `lock().expect()`, which panics if the mutex is poisoned.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Vec<Message>>>,
}

impl MemoryStorage {
    /// Create a new empty `MemoryStorage`
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[allow(clippy::expect_used)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").len()
    }

    /// True if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    #[allow(clippy::expect_used)]
    fn append(&self, message: &Message) -> Result<Message, StorageError> {
        let mut messages = self.inner.lock().expect("Mutex poisoned");

        let id = messages.len() as MessageId + 1;
        let mut stored = message.clone();
        stored.id = Some(id);
        messages.push(stored.clone());

        debug_assert_eq!(messages.len() as MessageId, id);
        Ok(stored)
    }

    #[allow(clippy::expect_used)]
    fn head(&self) -> Result<Option<MessageId>, StorageError> {
        let messages = self.inner.lock().expect("Mutex poisoned");
        Ok((!messages.is_empty()).then(|| messages.len() as MessageId))
    }

    #[allow(clippy::expect_used)]
    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, StorageError> {
        let messages = self.inner.lock().expect("Mutex poisoned");

        let upto = usize::try_from(next).unwrap_or(usize::MAX).min(messages.len());
        Ok(messages[..upto].iter().rev().take(limit).cloned().collect())
    }
}
