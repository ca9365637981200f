//! Subcommand implementations.
//!
//! Each command takes its collaborators explicitly (store, environment,
//! confirmation, output) so the binary wires real ones and tests wire
//! in-memory ones.

use std::{io::Write, path::Path};

use microblog_client::{
    AttachmentSaver, ClientConfig, ClientError, Confirm, Environment, FeedReader, FeedStore,
    IdentityStore, KeyError, Keyring, Publisher, SaveOutcome, Verifier, WalkRequest,
};

use crate::{
    error::CliError,
    output::{WELCOME_LINE, kept_file_line, message_line, posted_line},
};

/// `create`: generate and persist a new identity.
///
/// Declining to overwrite an existing identity is not an error.
pub fn create<E, C, W>(
    config: &ClientConfig,
    username: &str,
    env: &E,
    confirm: &mut C,
    out: &mut W,
) -> Result<(), CliError>
where
    E: Environment + ?Sized,
    C: Confirm + ?Sized,
    W: Write,
{
    let store = IdentityStore::new(&config.identity_path);
    match store.create(username, env, confirm) {
        Ok(identity) => {
            tracing::info!(fingerprint = %identity.fingerprint(), "created identity");
            writeln!(out, "{WELCOME_LINE}")?;
            Ok(())
        },
        Err(KeyError::OverwriteDeclined { .. }) => {
            writeln!(out, "Operation cancelled by the user.")?;
            Ok(())
        },
        Err(e) => Err(e.into()),
    }
}

/// `post`: sign and publish a message.
pub fn post<S, E, W>(
    config: &ClientConfig,
    store: &S,
    env: &E,
    text: &str,
    attachment: Option<&Path>,
    out: &mut W,
) -> Result<(), CliError>
where
    S: FeedStore,
    E: Environment + ?Sized,
    W: Write,
{
    let identity = IdentityStore::new(&config.identity_path).load()?;
    let stored = Publisher::new(&identity, store, env)
        .with_max_attachment_bytes(config.max_attachment_bytes)
        .publish(text, attachment)?;

    writeln!(out, "{}", posted_line(stored.id.unwrap_or_default()))?;
    Ok(())
}

/// What `list` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Walk start and count
    pub request: WalkRequest,
    /// Save attachments of listed messages
    pub save_attachments: bool,
}

/// `list`: print verified messages newest first, optionally saving their
/// attachments.
///
/// Listing lines go to `out`. Notices for the user, such as a kept
/// attachment file, go to `notices`. Output stops at the first message that
/// fails verification.
pub fn list<S, C, W, N>(
    config: &ClientConfig,
    store: S,
    options: ListOptions,
    confirm: &mut C,
    out: &mut W,
    notices: &mut N,
) -> Result<(), CliError>
where
    S: FeedStore,
    C: Confirm + ?Sized,
    W: Write,
    N: Write,
{
    let reader =
        FeedReader::new(store, Verifier::new(load_keyring(config)?)).with_page_cap(config.page_cap);
    let saver = options.save_attachments.then(|| AttachmentSaver::new(&config.attachment_dir));

    let mut io_error = None;
    let summary = reader.walk(options.request, |message| {
        let written = writeln!(out, "{}", message_line(&message));
        if let Err(e) = written {
            io_error = Some(e);
            return Err(ClientError::Config("output closed".to_string()));
        }

        let Some(saver) = &saver else {
            return Ok(());
        };
        match saver.save(&message, &mut *confirm)? {
            SaveOutcome::Saved(path) => {
                tracing::info!(path = %path.display(), "saved attachment");
            },
            SaveOutcome::Declined(path) => {
                tracing::info!(path = %path.display(), "attachment not overwritten");
                if let Err(e) = writeln!(notices, "{}", kept_file_line(&path)) {
                    io_error = Some(e);
                    return Err(ClientError::Config("output closed".to_string()));
                }
            },
            SaveOutcome::NoAttachment => {},
        }
        Ok(())
    });

    // A failed write stops the walk; report it rather than the stop signal.
    if let Some(e) = io_error {
        return Err(e.into());
    }
    let summary = summary?;
    tracing::debug!(emitted = summary.emitted, end = ?summary.end, "list complete");
    Ok(())
}

/// Keys for verification: the local identity plus any trusted public
/// identity files.
///
/// A missing local identity is fine when a keyring directory is configured.
fn load_keyring(config: &ClientConfig) -> Result<Keyring, CliError> {
    let mut keyring = Keyring::new();

    match IdentityStore::new(&config.identity_path).load() {
        Ok(identity) => keyring.add_identity(&identity)?,
        Err(KeyError::NotFound { .. }) if config.keyring_dir.is_some() => {},
        Err(e) => return Err(e.into()),
    }

    if let Some(dir) = &config.keyring_dir {
        let imported = keyring.load_dir(dir)?;
        tracing::debug!(imported, dir = %dir.display(), "loaded keyring");
    }

    Ok(keyring)
}
