//! Microblog Protocol
//!
//! Wire-level types for the Microblog feed: the message record exchanged with
//! the feed store, the canonical encoding that signatures are computed over,
//! and the protocol limits shared by clients and the server.
//!
//! # Message Lifecycle
//!
//! ```text
//! SignableFields ──encode──> canonical bytes ──sign──> signature
//!        │                                                 │
//!        └──────────────── Message (no id) <───────────────┘
//!                               │
//!                               ▼  POST /messages
//!                     Message (store-assigned id)
//! ```
//!
//! A reader re-derives [`SignableFields`] from every received [`Message`] and
//! re-encodes them; it never trusts bytes produced by anyone else.
//!
//! # Canonical Encoding
//!
//! Compact JSON with keys in a fixed order (`date`, `author`, `message`,
//! `attachment`). The server-assigned id and the signature are not part of
//! the encoding and cannot be expressed by [`SignableFields`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod canonical;
mod error;
pub mod limits;
mod message;

pub use canonical::encode;
pub use error::{EncodingError, WireError};
pub use message::{Attachment, Message, MessageId, SignableFields};
