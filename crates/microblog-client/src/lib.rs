//! Client
//!
//! Everything a Microblog author or reader does locally: hold an identity,
//! sign and publish messages, walk the feed backwards and verify every
//! message before it is shown or its attachment saved.
//!
//! # Architecture
//!
//! The feed walker follows the Sans-IO, action-based pattern: [`FeedWalker`]
//! receives store responses ([`WalkEvent`]) and returns [`WalkAction`]s.
//! [`FeedReader`] drives it synchronously against any [`FeedStore`].
//!
//! # Components
//!
//! - [`IdentityStore`]: create and load the local identity
//! - [`Keyring`]: public keys of authors the reader trusts
//! - [`Publisher`]: sign and submit messages
//! - [`Verifier`]: turn stored messages into [`VerifiedMessage`]s
//! - [`FeedWalker`] / [`FeedReader`]: backward paging with ordering checks
//! - [`AttachmentSaver`]: write verified attachments to disk
//! - [`Confirm`]: injected yes/no capability for destructive steps
//! - [`Environment`]: clock and randomness
//!
//! # Transport (optional)
//!
//! With the `http` feature enabled, [`store::HttpFeedStore`] talks to a feed
//! store server over HTTP.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attachment;
mod config;
mod confirm;
mod env;
mod error;
mod identity;
mod keyring;
mod publish;
mod reader;
pub mod store;
mod verify;
pub mod walker;

pub use attachment::{AttachmentSaver, SaveOutcome, read_attachment};
pub use config::{
    ClientConfig, DEFAULT_ATTACHMENT_DIR, DEFAULT_IDENTITY_PATH, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SERVER_URL,
};
pub use confirm::{Confirm, FixedAnswer, ScriptedConfirm};
pub use env::{Environment, FixedEnv, SystemEnv};
pub use error::{AttachmentError, ClientError, ErrorKind, KeyError, TransportError};
pub use identity::{Identity, IdentityStore, validate_username};
pub use keyring::Keyring;
pub use publish::Publisher;
pub use reader::{FeedReader, WalkSummary};
pub use store::{FeedStore, MemoryFeed};
pub use verify::{VerifiedMessage, Verifier, verify_message};
pub use walker::{FeedWalker, WalkAction, WalkEnd, WalkEvent, WalkRequest, WalkState};
