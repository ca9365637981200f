//! CLI errors and exit codes.

use std::{io, process::ExitCode};

use microblog_client::{ClientError, ErrorKind, KeyError};
use thiserror::Error;

/// Errors surfaced to the user.
#[derive(Error, Debug)]
pub enum CliError {
    /// A client operation failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Terminal input or output failed
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<KeyError> for CliError {
    fn from(err: KeyError) -> Self {
        Self::Client(err.into())
    }
}

impl CliError {
    /// Process exit code. Each error kind has its own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 1,
            Self::Client(err) => match err.kind() {
                ErrorKind::Config => 2,
                ErrorKind::Key => 3,
                ErrorKind::Transport => 4,
                ErrorKind::SignatureInvalid => 5,
                ErrorKind::MissingSignature => 6,
                ErrorKind::SizeExceeded => 7,
                ErrorKind::EmptyMessage => 8,
                ErrorKind::Protocol => 9,
                ErrorKind::Attachment => 10,
                ErrorKind::Encoding => 11,
            },
        }
    }
}

impl From<&CliError> for ExitCode {
    fn from(err: &CliError) -> Self {
        ExitCode::from(err.exit_code())
    }
}
