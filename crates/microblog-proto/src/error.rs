//! Protocol error types.

use thiserror::Error;

/// Canonical encoding failed.
///
/// Fatal for the signing or verification attempt that triggered it. There is
/// no fallback representation: a signature must only ever cover the bytes
/// produced by [`crate::encode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The serializer rejected one of the fields
    #[error("canonical encoding failed: {0}")]
    Serialize(String),

    /// The encoder produced something other than a JSON object
    #[error("canonical encoding produced malformed output")]
    Malformed,
}

/// Errors decoding messages received over the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Body is not valid JSON or does not match the message schema
    #[error("malformed message body: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
