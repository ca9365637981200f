//! Microblog command-line client.
//!
//! The `microblog` binary: `create` an identity, `post` signed messages and
//! `list` verified messages from a feed store. Command logic lives here,
//! generic over its collaborators; `main.rs` wires the terminal and the HTTP
//! store.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
mod error;
pub mod output;
mod prompt;

pub use error::CliError;
pub use prompt::TerminalConfirm;
