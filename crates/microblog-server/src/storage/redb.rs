//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Redb
//! allows one write transaction at a time, which serializes id assignment.
//! All messages survive server restarts.

use std::{fmt, path::Path, sync::Arc};

use microblog_proto::{Message, MessageId};
use redb::{Database, ReadableTable, TableDefinition};

use super::{Storage, StorageError};

/// Table: messages
/// Key: message id
/// Value: CBOR-encoded Message (id included)
const MESSAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("messages");

/// Durable storage backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStorage {
    db: Arc<Database>,
}

impl RedbStorage {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates the MESSAGES table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(MESSAGES).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl Storage for RedbStorage {
    fn append(&self, message: &Message) -> Result<Message, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let stored = {
            let mut table = txn.open_table(MESSAGES).map_err(io)?;

            let last = table.last().map_err(io)?.map(|(key, _)| key.value());
            let id = match last {
                Some(last) => last.checked_add(1).ok_or(StorageError::IdsExhausted)?,
                None => 1,
            };

            let mut stored = message.clone();
            stored.id = Some(id);
            let bytes = encode(&stored)?;
            table.insert(id, bytes.as_slice()).map_err(io)?;
            stored
        };

        txn.commit().map_err(io)?;

        Ok(stored)
    }

    fn head(&self) -> Result<Option<MessageId>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(MESSAGES).map_err(io)?;

        Ok(table.last().map_err(io)?.map(|(key, _)| key.value()))
    }

    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(MESSAGES).map_err(io)?;

        let mut messages = Vec::new();
        for result in table.range(..=next).map_err(io)?.rev().take(limit) {
            let (_, value) = result.map_err(io)?;
            messages.push(decode(value.value())?);
        }

        Ok(messages)
    }
}

fn encode(message: &Message) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(message, &mut bytes)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<Message, StorageError> {
    ciborium::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn io(err: impl fmt::Display) -> StorageError {
    StorageError::Io(err.to_string())
}
