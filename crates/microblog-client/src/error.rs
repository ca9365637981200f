//! Client error types.
//!
//! One variant per failure the user can act on. Verification failures come in
//! two kinds that must never be conflated:
//! - `SignatureInvalid`: a signature is present but wrong (forged or
//!   corrupted)
//! - `MissingSignature`: no signature at all (not a valid message)

use std::path::PathBuf;

use microblog_proto::{EncodingError, MessageId};
use thiserror::Error;

/// Errors from client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Canonical encoding failed. Fatal for the signing or verification
    /// attempt, never retried with another representation.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Identity or key lookup failed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A present signature did not verify. The message is rejected.
    #[error("signature invalid for message {} by {author}", display_id(.id))]
    SignatureInvalid {
        /// Id of the rejected message, if it had one
        id: Option<MessageId>,
        /// Claimed author
        author: String,
    },

    /// The message carries no signature field. Protocol violation.
    #[error("message {} has no signature", display_id(.id))]
    MissingSignature {
        /// Id of the rejected message, if it had one
        id: Option<MessageId>,
    },

    /// Feed store unreachable or returned an error.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Attachment is larger than the protocol allows.
    #[error("attachment {} is {size} bytes, maximum is {max}", path.display())]
    SizeExceeded {
        /// File that was rejected
        path: PathBuf,
        /// Its size in bytes
        size: u64,
        /// Allowed maximum in bytes
        max: u64,
    },

    /// Message text is empty or whitespace.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// Feed store broke the ordering or shape contract.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Attachment could not be read, decoded or written.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`ClientError`] for exit codes and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`ClientError::Encoding`]
    Encoding,
    /// [`ClientError::Key`]
    Key,
    /// [`ClientError::SignatureInvalid`]
    SignatureInvalid,
    /// [`ClientError::MissingSignature`]
    MissingSignature,
    /// [`ClientError::Transport`]
    Transport,
    /// [`ClientError::SizeExceeded`]
    SizeExceeded,
    /// [`ClientError::EmptyMessage`]
    EmptyMessage,
    /// [`ClientError::Protocol`]
    Protocol,
    /// [`ClientError::Attachment`]
    Attachment,
    /// [`ClientError::Config`]
    Config,
}

impl ClientError {
    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Key(_) => ErrorKind::Key,
            Self::SignatureInvalid { .. } => ErrorKind::SignatureInvalid,
            Self::MissingSignature { .. } => ErrorKind::MissingSignature,
            Self::Transport(_) => ErrorKind::Transport,
            Self::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            Self::EmptyMessage => ErrorKind::EmptyMessage,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Attachment(_) => ErrorKind::Attachment,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns true if this error means a message failed verification.
    ///
    /// Such messages must not be shown, saved or otherwise trusted.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::SignatureInvalid { .. } | Self::MissingSignature { .. })
    }
}

fn display_id(id: &Option<MessageId>) -> String {
    id.map_or_else(|| "(unstored)".to_string(), |id| id.to_string())
}

/// Errors loading, creating or looking up identities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// No identity file at the configured path
    #[error("no identity found at {}; run `create` first", path.display())]
    NotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Identity file exists but cannot be parsed into username and keys
    #[error("identity file {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Signing was requested with an identity that has no private key
    #[error("identity {username} has no private key")]
    PublicOnly {
        /// Username of the public-only identity
        username: String,
    },

    /// No public key is known for a message's claimed author
    #[error("no public key known for author {0}")]
    UnknownAuthor(String),

    /// Two keyring entries claim the same username with different keys
    #[error("conflicting public keys for {username}")]
    ConflictingKey {
        /// Username with more than one key
        username: String,
    },

    /// Username is empty, too long or contains control characters
    #[error("invalid username: {reason}")]
    InvalidUsername {
        /// Why the username was rejected
        reason: String,
    },

    /// User declined to overwrite an existing identity
    #[error("kept existing identity at {}", path.display())]
    OverwriteDeclined {
        /// Identity that was kept
        path: PathBuf,
    },

    /// Filesystem failure reading or writing key material
    #[error("identity I/O error at {}: {reason}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },
}

/// Errors talking to the feed store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Store could not be reached or did not answer in time
    #[error("feed store unreachable: {0}")]
    Unreachable(String),

    /// Store answered with a non-success status
    #[error("feed store returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Store answered with a body that is not a message or message list
    #[error("malformed response from feed store: {0}")]
    Malformed(String),
}

impl From<microblog_proto::WireError> for TransportError {
    fn from(err: microblog_proto::WireError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Errors handling attachment files.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    /// Path does not exist or is not a regular file
    #[error("{} does not exist or is not a file", path.display())]
    NotAFile {
        /// Offending path
        path: PathBuf,
    },

    /// Attachment payload is not valid base64
    #[error("attachment of message {id} is not valid base64: {reason}")]
    Decode {
        /// Message carrying the payload
        id: MessageId,
        /// Decoder error
        reason: String,
    },

    /// Reading or writing the file failed
    #[error("attachment I/O error at {}: {reason}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },
}
