//! Attachment handling.
//!
//! Outbound: a local file is size-checked and base64 encoded before anything
//! touches the network. Inbound: a verified message's attachment is decoded
//! and written to `<dir>/<id>.out`, asking before an existing file is
//! replaced.

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use microblog_proto::{Attachment, MessageId};

use crate::{
    confirm::Confirm,
    error::{AttachmentError, ClientError},
    verify::VerifiedMessage,
};

/// Read and encode the file at `path`.
///
/// The size is checked from metadata before reading, and the bytes actually
/// read are checked again, so a file that grows in between is still
/// rejected.
///
/// # Errors
///
/// - `Attachment(NotAFile)`: `path` is missing or not a regular file
/// - `SizeExceeded`: the file is larger than `max_bytes`
/// - `Attachment(Io)`: reading failed
pub fn read_attachment(path: &Path, max_bytes: u64) -> Result<Attachment, ClientError> {
    let io = |e: std::io::Error| AttachmentError::Io { path: path.to_path_buf(), reason: e.to_string() };

    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(AttachmentError::NotAFile { path: path.to_path_buf() }.into()),
    };
    check_size(path, metadata.len(), max_bytes)?;

    // Read one byte past the limit so growth after the metadata check shows.
    let mut bytes = Vec::with_capacity(metadata.len() as usize);
    File::open(path)
        .map_err(io)?
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(io)?;
    check_size(path, bytes.len() as u64, max_bytes)?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "attachment read");
    Ok(Attachment::from_bytes(&bytes))
}

fn check_size(path: &Path, size: u64, max: u64) -> Result<(), ClientError> {
    if size > max {
        return Err(ClientError::SizeExceeded { path: path.to_path_buf(), size, max });
    }
    Ok(())
}

/// Result of [`AttachmentSaver::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Attachment written to this path
    Saved(PathBuf),
    /// File existed and the user kept it
    Declined(PathBuf),
    /// Message has no attachment
    NoAttachment,
}

/// Writes inbound attachments into a directory.
#[derive(Debug, Clone)]
pub struct AttachmentSaver {
    dir: PathBuf,
}

impl AttachmentSaver {
    /// Saver writing into `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the attachment of message `id` is written.
    pub fn target_path(&self, id: MessageId) -> PathBuf {
        self.dir.join(format!("{id}.out"))
    }

    /// Decode and write the attachment of `message`.
    ///
    /// Only verified messages are accepted, so unverified bytes never reach
    /// the filesystem. An existing target is replaced only if `confirm`
    /// agrees; otherwise it is left untouched.
    pub fn save<C>(&self, message: &VerifiedMessage, confirm: &mut C) -> Result<SaveOutcome, ClientError>
    where
        C: Confirm + ?Sized,
    {
        let Some(attachment) = message.attachment.as_ref().filter(|a| !a.is_empty()) else {
            return Ok(SaveOutcome::NoAttachment);
        };

        let bytes = attachment.decode().map_err(|e| AttachmentError::Decode {
            id: message.id(),
            reason: e.to_string(),
        })?;

        let path = self.target_path(message.id());
        if path.exists() {
            let question = format!("{} already exists. Overwrite?", path.display());
            if !confirm.confirm(&question) {
                tracing::info!(path = %path.display(), "kept existing attachment");
                return Ok(SaveOutcome::Declined(path));
            }
        }

        let io = |e: std::io::Error| AttachmentError::Io { path: path.clone(), reason: e.to_string() };
        fs::create_dir_all(&self.dir).map_err(io)?;
        fs::write(&path, &bytes).map_err(io)?;

        tracing::info!(id = message.id(), path = %path.display(), size = bytes.len(), "attachment saved");
        Ok(SaveOutcome::Saved(path))
    }
}
