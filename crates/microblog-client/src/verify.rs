//! Signature verification.
//!
//! Verification re-derives the canonical encoding from the message's own
//! content fields and checks the signature against the author's public key.
//! A message that fails is rejected; a [`VerifiedMessage`] can only be
//! produced here, so code that takes one never sees unverified content.

use std::ops::Deref;

use microblog_crypto::{VerifyingKey, verify};
use microblog_proto::{Message, MessageId};

use crate::{error::ClientError, keyring::Keyring};

/// Check `message`'s signature under `key`.
///
/// Returns `Ok(false)` for a present but wrong signature.
///
/// # Errors
///
/// - `MissingSignature`: the message has no signature field
/// - `Encoding`: the content could not be canonically encoded
pub fn verify_message(message: &Message, key: &VerifyingKey) -> Result<bool, ClientError> {
    let signature = message
        .signature
        .as_deref()
        .ok_or(ClientError::MissingSignature { id: message.id })?;

    let canonical = message.canonical_bytes()?;
    Ok(verify(&canonical, signature, key))
}

/// A stored message whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedMessage {
    id: MessageId,
    message: Message,
}

impl VerifiedMessage {
    /// Store-assigned id.
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The verified message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Unwrap into the underlying message.
    pub fn into_inner(self) -> Message {
        self.message
    }
}

impl Deref for VerifiedMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

/// Verifies stored messages against a [`Keyring`].
#[derive(Debug, Clone)]
pub struct Verifier {
    keyring: Keyring,
}

impl Verifier {
    /// Verifier using `keyring` for author lookup.
    pub fn new(keyring: Keyring) -> Self {
        Self { keyring }
    }

    /// Known keys.
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Verify a stored message.
    ///
    /// # Errors
    ///
    /// - `Protocol`: the message has no store-assigned id
    /// - `MissingSignature`: no signature field
    /// - `Key(UnknownAuthor)`: no key for the claimed author
    /// - `SignatureInvalid`: signature present but wrong
    /// - `Encoding`: canonical encoding failed
    pub fn verify(&self, message: Message) -> Result<VerifiedMessage, ClientError> {
        let id = message
            .id
            .ok_or_else(|| ClientError::Protocol("stored message has no message-id".to_string()))?;

        if message.signature.is_none() {
            return Err(ClientError::MissingSignature { id: Some(id) });
        }

        let key = self.keyring.require(&message.author)?;
        if !verify_message(&message, key)? {
            tracing::warn!(id, author = %message.author, "rejected message with invalid signature");
            return Err(ClientError::SignatureInvalid { id: Some(id), author: message.author });
        }

        Ok(VerifiedMessage { id, message })
    }
}
