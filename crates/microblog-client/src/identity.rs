//! Identity store.
//!
//! An identity is a username bound to an Ed25519 keypair. The owner's file
//! holds the private key; public-only files are what other readers import
//! into their keyring.
//!
//! # File Format
//!
//! A single CBOR map with keys in fixed order:
//!
//! ```text
//! { "username": text, "public_key": bytes(32), "private_key": bytes(32)? }
//! ```
//!
//! Files are written atomically (temp file in the same directory, fsync,
//! rename) and, on Unix, with owner-only permissions. Confidentiality of the
//! private key beyond filesystem permissions is an operational concern.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use microblog_crypto::{
    SECRET_KEY_LENGTH, SigningKey, VerifyingKey, fingerprint, generate_signing_key,
    signing_key_from_bytes, verifying_key_from_bytes,
};
use microblog_proto::limits::MAX_USERNAME_LEN;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{confirm::Confirm, env::Environment, error::KeyError};

/// A username bound to a public key, with the private key when owned.
#[derive(Clone)]
pub struct Identity {
    username: String,
    verifying_key: VerifyingKey,
    signing_key: Option<SigningKey>,
}

impl Identity {
    /// Build an owned identity from a signing key.
    pub fn from_signing_key(
        username: impl Into<String>,
        signing_key: SigningKey,
    ) -> Result<Self, KeyError> {
        let username = username.into();
        validate_username(&username)?;

        Ok(Self { username, verifying_key: signing_key.verifying_key(), signing_key: Some(signing_key) })
    }

    /// Build a public-only identity.
    pub fn public(username: impl Into<String>, verifying_key: VerifyingKey) -> Result<Self, KeyError> {
        let username = username.into();
        validate_username(&username)?;

        Ok(Self { username, verifying_key, signing_key: None })
    }

    /// Username this identity publishes as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Public key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Private key, if this identity is owned.
    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.signing_key.as_ref()
    }

    /// Private key, or `PublicOnly` for an identity without one.
    pub fn require_signing_key(&self) -> Result<&SigningKey, KeyError> {
        self.signing_key
            .as_ref()
            .ok_or_else(|| KeyError::PublicOnly { username: self.username.clone() })
    }

    /// Short hex fingerprint of the public key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.verifying_key)
    }

    /// Copy of this identity without the private key.
    pub fn to_public(&self) -> Self {
        Self { username: self.username.clone(), verifying_key: self.verifying_key, signing_key: None }
    }

    /// Write this identity's public half to `path` for other readers.
    pub fn export_public(&self, path: &Path) -> Result<(), KeyError> {
        write_identity(path, &self.to_public())
    }

    /// Read an identity file, owned or public-only.
    pub fn read_file(path: &Path) -> Result<Self, KeyError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeyError::NotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(io_error(path, &e)),
        };

        let mut stored: StoredIdentity =
            ciborium::from_reader(io::BufReader::new(file)).map_err(|e| corrupt(path, e))?;

        let identity = stored.decode(path);
        stored.zeroize_private();
        identity
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("fingerprint", &self.fingerprint())
            .field("owned", &self.signing_key.is_some())
            .finish()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.verifying_key == other.verifying_key
            && self.signing_key.as_ref().map(SigningKey::to_bytes)
                == other.signing_key.as_ref().map(SigningKey::to_bytes)
    }
}

impl Eq for Identity {}

/// Persistent home of the local identity.
///
/// [`IdentityStore::create`] is the only operation that writes key material.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Identity file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if an identity file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Generate and persist a fresh identity for `username`.
    ///
    /// If an identity already exists, `confirm` is asked first; declining
    /// returns `OverwriteDeclined` and leaves the existing file untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidUsername`: empty, too long or contains control characters
    /// - `OverwriteDeclined`: user kept the existing identity
    /// - `Io`: the file could not be written
    pub fn create<E, C>(&self, username: &str, env: &E, confirm: &mut C) -> Result<Identity, KeyError>
    where
        E: Environment + ?Sized,
        C: Confirm + ?Sized,
    {
        let username = username.trim();
        validate_username(username)?;

        if self.exists() {
            let question = format!("{} already exists. Overwrite?", self.path.display());
            if !confirm.confirm(&question) {
                tracing::info!(path = %self.path.display(), "identity overwrite declined");
                return Err(KeyError::OverwriteDeclined { path: self.path.clone() });
            }
        }

        let mut seed = [0u8; SECRET_KEY_LENGTH];
        env.random_bytes(&mut seed);
        let identity = Identity::from_signing_key(username, generate_signing_key(seed))?;

        write_identity(&self.path, &identity)?;

        tracing::info!(
            username = identity.username(),
            fingerprint = %identity.fingerprint(),
            path = %self.path.display(),
            "identity created"
        );

        Ok(identity)
    }

    /// Load the persisted identity.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no identity file exists
    /// - `Corrupt`: the file cannot be parsed into username and keys
    pub fn load(&self) -> Result<Identity, KeyError> {
        let identity = Identity::read_file(&self.path)?;
        tracing::debug!(username = identity.username(), "identity loaded");
        Ok(identity)
    }
}

/// Check a username is usable as an author name.
pub fn validate_username(username: &str) -> Result<(), KeyError> {
    let reason = if username.trim().is_empty() {
        "username is empty".to_string()
    } else if username.len() > MAX_USERNAME_LEN {
        format!("username exceeds {MAX_USERNAME_LEN} bytes")
    } else if username.chars().any(char::is_control) {
        "username contains control characters".to_string()
    } else if username != username.trim() {
        "username has leading or trailing whitespace".to_string()
    } else {
        return Ok(());
    };

    Err(KeyError::InvalidUsername { reason })
}

/// On-disk form. Field order is the file's key order.
#[derive(Serialize, Deserialize)]
struct StoredIdentity {
    username: String,
    public_key: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    private_key: Option<Vec<u8>>,
}

impl StoredIdentity {
    fn encode(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
            public_key: identity.verifying_key.as_bytes().to_vec(),
            private_key: identity.signing_key.as_ref().map(|k| k.to_bytes().to_vec()),
        }
    }

    fn decode(&self, path: &Path) -> Result<Identity, KeyError> {
        validate_username(&self.username).map_err(|e| corrupt(path, e))?;

        let verifying_key = verifying_key_from_bytes(&self.public_key).map_err(|e| corrupt(path, e))?;

        let signing_key = match &self.private_key {
            Some(bytes) => {
                let key = signing_key_from_bytes(bytes).map_err(|e| corrupt(path, e))?;
                if key.verifying_key() != verifying_key {
                    return Err(corrupt(path, "private key does not match public key"));
                }
                Some(key)
            },
            None => None,
        };

        Ok(Identity { username: self.username.clone(), verifying_key, signing_key })
    }

    fn zeroize_private(&mut self) {
        if let Some(key) = self.private_key.as_mut() {
            key.zeroize();
        }
    }
}

fn write_identity(path: &Path, identity: &Identity) -> Result<(), KeyError> {
    let mut stored = StoredIdentity::encode(identity);
    let mut bytes = Vec::new();
    let encoded = ciborium::into_writer(&stored, &mut bytes);
    stored.zeroize_private();
    encoded.map_err(|e| KeyError::Io { path: path.to_path_buf(), reason: e.to_string() })?;

    let result = write_atomic(path, &bytes);
    bytes.zeroize();
    result.map_err(|e| io_error(path, &e))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = write_private(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn corrupt(path: &Path, reason: impl fmt::Display) -> KeyError {
    KeyError::Corrupt { path: path.to_path_buf(), reason: reason.to_string() }
}

fn io_error(path: &Path, err: &io::Error) -> KeyError {
    KeyError::Io { path: path.to_path_buf(), reason: err.to_string() }
}
