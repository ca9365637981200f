//! Message record and wire shape.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{EncodingError, WireError, canonical};

/// Server-assigned message identifier.
///
/// Assigned by the feed store starting at 1 and strictly increasing. Clients
/// never pick ids.
pub type MessageId = u64;

/// Base64 attachment payload as carried on the wire.
///
/// Kept in its transmitted text form: the signature covers this exact text,
/// so decoding and re-encoding it before verification could change the
/// signed bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attachment(String);

impl Attachment {
    /// Encode raw file bytes for transport.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap an already-encoded payload received from the wire.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Decode the payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.0.as_bytes())
    }

    /// Encoded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the encoded text in bytes.
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }

    /// True if the payload is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The fields covered by a message signature.
///
/// Field order here is the canonical order. There is deliberately no way to
/// carry the id or the signature in this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignableFields<'a> {
    /// Publication timestamp (ISO-8601)
    pub date: &'a str,
    /// Claimed author username
    pub author: &'a str,
    /// Message text
    #[serde(rename = "message")]
    pub text: &'a str,
    /// Base64 attachment, only encoded when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<&'a str>,
}

/// A feed message.
///
/// Wire shape:
///
/// ```text
/// {"date": ..., "author": ..., "message": ..., "attachment": ...,
///  "signature": ..., "message-id": ...}
/// ```
///
/// `attachment` is optional. `message-id` is absent until the store assigns
/// it. `signature` is required by the protocol but modeled as optional so a
/// reader can tell an unsigned message apart from one with a bad signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Publication timestamp (ISO-8601)
    pub date: String,

    /// Claimed author username
    pub author: String,

    /// Message text
    #[serde(rename = "message")]
    pub text: String,

    /// Optional base64 attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,

    /// Base64 signature over the canonical encoding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Store-assigned id
    #[serde(rename = "message-id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
}

impl Message {
    /// Create an unsigned, unstored message.
    pub fn new(
        date: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        attachment: Option<Attachment>,
    ) -> Self {
        Self {
            date: date.into(),
            author: author.into(),
            text: text.into(),
            attachment,
            signature: None,
            id: None,
        }
    }

    /// Signable fields re-derived from this message.
    pub fn signable(&self) -> SignableFields<'_> {
        SignableFields {
            date: &self.date,
            author: &self.author,
            text: &self.text,
            attachment: self.attachment.as_ref().map(Attachment::as_str),
        }
    }

    /// Canonical encoding of this message's signable fields.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        canonical::encode(&self.signable())
    }

    /// True if the message carries a non-empty attachment.
    pub fn has_attachment(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| !a.is_empty())
    }

    /// Same content fields as `other`, ignoring id and signature.
    pub fn same_content(&self, other: &Self) -> bool {
        self.signable() == other.signable()
    }

    /// Parse a single message from a JSON body.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parse a JSON array of messages.
    pub fn list_from_json(bytes: &[u8]) -> Result<Vec<Self>, WireError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to the JSON wire shape.
    pub fn to_json(&self) -> Result<Vec<u8>, EncodingError> {
        serde_json::to_vec(self).map_err(|e| EncodingError::Serialize(e.to_string()))
    }
}
