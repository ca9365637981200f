//! Storage error types.

use thiserror::Error;

/// Errors from a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend I/O or transaction failure. May be transient.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// A stored record could not be encoded or decoded. Indicates a bug or
    /// on-disk corruption.
    #[error("storage serialization error: {0}")]
    Serialization(String),

    /// The id space is exhausted.
    #[error("no message ids left")]
    IdsExhausted,
}
