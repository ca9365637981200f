//! Crypto error types.

use thiserror::Error;

/// Errors decoding key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key bytes have the wrong length for Ed25519
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Required length
        expected: usize,
        /// Length that was provided
        got: usize,
    },

    /// Bytes are the right length but not a valid key
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
}
