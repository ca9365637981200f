//! Microblog Cryptographic Primitives
//!
//! Signing building blocks for Microblog. Pure functions with deterministic
//! outputs. Callers provide random bytes for key generation, which keeps
//! tests deterministic and leaves the entropy source to the environment.
//!
//! # Scheme
//!
//! Ed25519 over the canonical encoding of a message's signable fields.
//! Signatures are deterministic: the same key and bytes always yield the same
//! signature. Ed25519 offers roughly 128-bit security, above RSA-2048.
//!
//! ```text
//! 32 random bytes ──> SigningKey ──> VerifyingKey
//!                          │               │
//! canonical bytes ──> sign ──> base64 ──> verify ──> bool
//! ```
//!
//! # Security
//!
//! - Key seeds are zeroized after the signing key is derived
//! - Verification never panics or errors on a malformed signature value; it
//!   returns `false` so callers treat garbage exactly like a forgery
//! - Verification uses `verify_strict`, rejecting small-order keys and
//!   non-canonical signature encodings

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod keys;
pub mod signing;

pub use ed25519_dalek::{SigningKey, VerifyingKey};
pub use error::CryptoError;
pub use keys::{
    PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, fingerprint, generate_signing_key, signing_key_from_bytes,
    verifying_key_from_bytes,
};
pub use signing::{SIGNATURE_LENGTH, sign, verify};
