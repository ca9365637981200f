//! Signature creation and verification over canonical bytes.
//!
//! Signatures travel as standard padded base64. Verification is total: any
//! input that is not a valid signature for the bytes under the key, including
//! undecodable base64 and wrong-length signatures, yields `false`.

use base64::{Engine, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// Sign canonical bytes, returning the base64 transport form.
pub fn sign(canonical: &[u8], key: &SigningKey) -> String {
    STANDARD.encode(key.sign(canonical).to_bytes())
}

/// Check a base64 signature over canonical bytes.
pub fn verify(canonical: &[u8], signature: &str, key: &VerifyingKey) -> bool {
    let Ok(raw) = STANDARD.decode(signature.as_bytes()) else {
        return false;
    };

    let Ok(raw) = <[u8; SIGNATURE_LENGTH]>::try_from(raw.as_slice()) else {
        return false;
    };

    key.verify_strict(canonical, &Signature::from_bytes(&raw)).is_ok()
}
