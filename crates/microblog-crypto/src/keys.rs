//! Key generation and decoding.

use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::CryptoError;

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

/// Ed25519 secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;

/// Number of digest bytes shown in a fingerprint.
const FINGERPRINT_BYTES: usize = 16;

/// Derive a signing key from caller-provided random bytes.
///
/// The seed is zeroized before returning. Caller MUST provide
/// cryptographically secure random bytes in production.
pub fn generate_signing_key(mut seed: [u8; SECRET_KEY_LENGTH]) -> SigningKey {
    let key = SigningKey::from_bytes(&seed);
    seed.zeroize();
    key
}

/// Decode a signing key from its 32 secret bytes.
///
/// # Errors
///
/// - `InvalidKeyLength`: slice is not 32 bytes
pub fn signing_key_from_bytes(bytes: &[u8]) -> Result<SigningKey, CryptoError> {
    let Ok(mut secret) = <[u8; SECRET_KEY_LENGTH]>::try_from(bytes) else {
        return Err(CryptoError::InvalidKeyLength { expected: SECRET_KEY_LENGTH, got: bytes.len() });
    };

    let key = SigningKey::from_bytes(&secret);
    secret.zeroize();
    Ok(key)
}

/// Decode a verifying key from its 32 compressed bytes.
///
/// # Errors
///
/// - `InvalidKeyLength`: slice is not 32 bytes
/// - `InvalidKey`: bytes are not a valid curve point
pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey, CryptoError> {
    let Ok(compressed) = <[u8; PUBLIC_KEY_LENGTH]>::try_from(bytes) else {
        return Err(CryptoError::InvalidKeyLength { expected: PUBLIC_KEY_LENGTH, got: bytes.len() });
    };

    VerifyingKey::from_bytes(&compressed)
        .map_err(|e| CryptoError::InvalidKey { reason: e.to_string() })
}

/// Short hex fingerprint of a public key (first 16 bytes of SHA-256).
pub fn fingerprint(key: &VerifyingKey) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_key() {
        let a = generate_signing_key([7u8; 32]);
        let b = generate_signing_key([7u8; 32]);
        assert_eq!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn different_seed_different_key() {
        let a = generate_signing_key([1u8; 32]);
        let b = generate_signing_key([2u8; 32]);
        assert_ne!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn secret_bytes_round_trip() {
        let key = generate_signing_key([9u8; 32]);
        let decoded = signing_key_from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(decoded.verifying_key(), key.verifying_key());
    }

    #[test]
    fn rejects_wrong_length_keys() {
        assert_eq!(
            signing_key_from_bytes(&[0u8; 31]).unwrap_err(),
            CryptoError::InvalidKeyLength { expected: 32, got: 31 }
        );
        assert_eq!(
            verifying_key_from_bytes(&[0u8; 33]).unwrap_err(),
            CryptoError::InvalidKeyLength { expected: 32, got: 33 }
        );
    }

    #[test]
    fn public_bytes_round_trip() {
        let key = generate_signing_key([3u8; 32]).verifying_key();
        assert_eq!(verifying_key_from_bytes(key.as_bytes()).unwrap(), key);
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let key = generate_signing_key([5u8; 32]).verifying_key();
        let fp = fingerprint(&key);

        assert_eq!(fp.len(), 32);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fingerprint(&key));
    }
}
