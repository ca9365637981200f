//! Publishing signed messages.

use std::path::Path;

use microblog_crypto::sign;
use microblog_proto::{Message, limits::MAX_ATTACHMENT_BYTES};

use crate::{
    attachment::read_attachment, env::Environment, error::ClientError, identity::Identity,
    store::FeedStore,
};

/// Signs and submits messages as one identity.
#[derive(Debug)]
pub struct Publisher<'a, S, E: ?Sized> {
    identity: &'a Identity,
    store: &'a S,
    env: &'a E,
    max_attachment_bytes: u64,
}

impl<'a, S: FeedStore, E: Environment + ?Sized> Publisher<'a, S, E> {
    /// Publisher for `identity` against `store`.
    pub fn new(identity: &'a Identity, store: &'a S, env: &'a E) -> Self {
        Self { identity, store, env, max_attachment_bytes: MAX_ATTACHMENT_BYTES }
    }

    /// Override the attachment size cap.
    #[must_use]
    pub fn with_max_attachment_bytes(mut self, max: u64) -> Self {
        self.max_attachment_bytes = max;
        self
    }

    /// Sign and publish `text`, optionally with the file at `attachment`.
    ///
    /// Every local check (text, key, attachment) happens before the store is
    /// contacted. Returns the stored message with its assigned id.
    ///
    /// # Errors
    ///
    /// - `EmptyMessage`: text is empty or whitespace
    /// - `Key(PublicOnly)`: identity has no private key
    /// - `SizeExceeded` / `Attachment`: attachment rejected
    /// - `Encoding`: canonical encoding failed
    /// - `Transport`: store unreachable or refused the message
    /// - `Protocol`: store echoed something other than what was sent
    pub fn publish(&self, text: &str, attachment: Option<&Path>) -> Result<Message, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let key = self.identity.require_signing_key()?;

        let attachment = attachment
            .map(|path| read_attachment(path, self.max_attachment_bytes))
            .transpose()?;

        let mut message =
            Message::new(self.env.message_date(), self.identity.username(), text, attachment);
        let canonical = message.canonical_bytes()?;
        message.signature = Some(sign(&canonical, key));

        let stored = self.store.publish(&message)?;

        let Some(id) = stored.id else {
            return Err(ClientError::Protocol("store did not assign a message-id".to_string()));
        };
        if !stored.same_content(&message) || stored.signature != message.signature {
            return Err(ClientError::Protocol(format!("store altered message {id}")));
        }

        tracing::info!(id, author = self.identity.username(), "message published");
        Ok(stored)
    }
}
