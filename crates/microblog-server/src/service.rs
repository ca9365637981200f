//! Request handling independent of HTTP.
//!
//! The store does not verify signatures; it has no key directory. It checks
//! that a submitted message is well formed so every reader gets records it
//! can at least attempt to verify.

use microblog_proto::{
    Message, MessageId,
    limits::{MAX_USERNAME_LEN, max_encoded_attachment_len},
};
use serde::Deserialize;
use thiserror::Error;

use crate::storage::{Storage, StorageError};

/// Errors from [`FeedService`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Request body or parameters are invalid
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Storage backend failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Query parameters of `GET /messages`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// Number of most recent messages (absent: all)
    pub count: Option<usize>,
    /// Page size
    pub limit: Option<usize>,
    /// Highest id wanted
    pub next: Option<MessageId>,
}

/// Normalized listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Most recent messages
    Latest(Option<usize>),
    /// Up to `limit` messages with id ≤ `next`
    Page {
        /// Page size
        limit: usize,
        /// Highest id wanted
        next: MessageId,
    },
}

impl ListQuery {
    /// Resolve the query into a [`Listing`].
    ///
    /// `count` cannot be combined with `limit`/`next`. `limit` without `next`
    /// starts at the head; `next` without `limit` returns everything from
    /// `next` down.
    pub fn listing(&self) -> Result<Listing, ServiceError> {
        match (self.count, self.limit, self.next) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ServiceError::Invalid(
                "count cannot be combined with limit or next".to_string(),
            )),
            (count, None, None) => Ok(Listing::Latest(count)),
            (None, limit, next) => Ok(Listing::Page {
                limit: limit.unwrap_or(usize::MAX),
                next: next.unwrap_or(MessageId::MAX),
            }),
        }
    }
}

/// Validates and serves feed requests against a [`Storage`].
#[derive(Debug, Clone)]
pub struct FeedService<S> {
    storage: S,
    max_attachment_len: usize,
}

impl<S: Storage> FeedService<S> {
    /// Service over `storage` with the protocol attachment limit.
    pub fn new(storage: S) -> Self {
        Self { storage, max_attachment_len: max_encoded_attachment_len() }
    }

    /// Override the largest accepted encoded attachment, in base64 bytes.
    #[must_use]
    pub fn with_max_attachment_len(mut self, max: usize) -> Self {
        self.max_attachment_len = max;
        self
    }

    /// Largest accepted encoded attachment, in base64 bytes.
    pub fn max_attachment_len(&self) -> usize {
        self.max_attachment_len
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Validate and append a submitted message.
    pub fn submit(&self, message: &Message) -> Result<Message, ServiceError> {
        self.validate(message)?;

        let stored = self.storage.append(message)?;
        tracing::info!(id = stored.id, author = %stored.author, "message stored");
        Ok(stored)
    }

    /// List messages, newest first.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<Message>, ServiceError> {
        let messages = match query.listing()? {
            Listing::Latest(count) => self.storage.latest(count)?,
            Listing::Page { limit, next } => self.storage.page(limit, next)?,
        };
        tracing::debug!(?query, returned = messages.len(), "listed messages");
        Ok(messages)
    }

    fn validate(&self, message: &Message) -> Result<(), ServiceError> {
        let invalid = |reason: &str| Err(ServiceError::Invalid(reason.to_string()));

        if message.id.is_some() {
            return invalid("message-id is assigned by the store");
        }
        if message.date.trim().is_empty() {
            return invalid("date is required");
        }
        if message.author.trim().is_empty() || message.author.len() > MAX_USERNAME_LEN {
            return invalid("author is missing or too long");
        }
        if message.text.trim().is_empty() {
            return invalid("message text is required");
        }
        if message.signature.as_deref().is_none_or(str::is_empty) {
            return invalid("signature is required");
        }
        if message.attachment.as_ref().is_some_and(|a| a.encoded_len() > self.max_attachment_len) {
            return invalid("attachment exceeds the size limit");
        }
        Ok(())
    }
}
