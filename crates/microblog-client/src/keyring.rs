//! Known public keys by username.

use std::{
    collections::{HashMap, hash_map::Entry},
    fs,
    path::Path,
};

use microblog_crypto::VerifyingKey;

use crate::{error::KeyError, identity::Identity};

/// Username to public key map used to check message signatures.
///
/// One key per username. Inserting a different key for a known username is
/// a `ConflictingKey` error; re-inserting the same key is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    keys: HashMap<String, VerifyingKey>,
}

impl Keyring {
    /// Empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keyring that knows only `identity`.
    pub fn with_identity(identity: &Identity) -> Self {
        let mut keyring = Self::new();
        keyring.keys.insert(identity.username().to_string(), *identity.verifying_key());
        keyring
    }

    /// Register `key` for `username`.
    pub fn insert(&mut self, username: impl Into<String>, key: VerifyingKey) -> Result<(), KeyError> {
        match self.keys.entry(username.into()) {
            Entry::Occupied(entry) if *entry.get() != key => {
                Err(KeyError::ConflictingKey { username: entry.key().clone() })
            },
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(key);
                Ok(())
            },
        }
    }

    /// Register the public half of `identity`.
    pub fn add_identity(&mut self, identity: &Identity) -> Result<(), KeyError> {
        self.insert(identity.username(), *identity.verifying_key())
    }

    /// Import every identity file in `dir`.
    ///
    /// Files are read in name order. Private keys in imported files are
    /// ignored. Returns the number of files imported.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, KeyError> {
        let io = |e: std::io::Error| KeyError::Io { path: dir.to_path_buf(), reason: e.to_string() };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io)? {
            let path = entry.map_err(io)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let identity = Identity::read_file(path)?;
            self.add_identity(&identity)?;
            tracing::debug!(username = identity.username(), path = %path.display(), "imported public key");
        }

        Ok(paths.len())
    }

    /// Public key for `username`.
    pub fn get(&self, username: &str) -> Option<&VerifyingKey> {
        self.keys.get(username)
    }

    /// Public key for `username`, or `UnknownAuthor`.
    pub fn require(&self, username: &str) -> Result<&VerifyingKey, KeyError> {
        self.get(username).ok_or_else(|| KeyError::UnknownAuthor(username.to_string()))
    }

    /// Number of known usernames.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no keys are known.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use microblog_crypto::generate_signing_key;
    use tempfile::tempdir;

    use super::*;

    fn identity(name: &str, seed: u8) -> Identity {
        Identity::from_signing_key(name, generate_signing_key([seed; 32])).unwrap()
    }

    #[test]
    fn lookup_by_username() {
        let alice = identity("alice", 1);
        let keyring = Keyring::with_identity(&alice);

        assert_eq!(keyring.get("alice"), Some(alice.verifying_key()));
        assert_eq!(keyring.require("bob").unwrap_err(), KeyError::UnknownAuthor("bob".into()));
    }

    #[test]
    fn same_key_twice_is_fine() {
        let alice = identity("alice", 1);
        let mut keyring = Keyring::new();
        keyring.add_identity(&alice).unwrap();
        keyring.add_identity(&alice).unwrap();
        assert_eq!(keyring.len(), 1);
    }

    #[test]
    fn different_key_for_same_username_conflicts() {
        let mut keyring = Keyring::with_identity(&identity("alice", 1));
        let err = keyring.add_identity(&identity("alice", 2)).unwrap_err();
        assert_eq!(err, KeyError::ConflictingKey { username: "alice".into() });
        assert_eq!(keyring.get("alice"), Some(identity("alice", 1).verifying_key()));
    }

    #[test]
    fn load_dir_imports_public_files() {
        let dir = tempdir().unwrap();
        identity("alice", 1).export_public(&dir.path().join("alice.pub")).unwrap();
        identity("bob", 2).export_public(&dir.path().join("bob.pub")).unwrap();

        let mut keyring = Keyring::new();
        assert_eq!(keyring.load_dir(dir.path()).unwrap(), 2);
        assert!(keyring.get("alice").is_some());
        assert!(keyring.get("bob").is_some());
    }

    #[test]
    fn load_dir_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("junk.pub"), b"junk").unwrap();

        let result = Keyring::new().load_dir(dir.path());
        assert!(matches!(result, Err(KeyError::Corrupt { .. })));
    }
}
