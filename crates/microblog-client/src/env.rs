//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from system resources (wall clock, randomness).
//! Production uses [`SystemEnv`]; tests and simulations use [`FixedEnv`],
//! which returns a pinned time and a seeded byte stream.

#![allow(clippy::disallowed_types, reason = "FixedEnv locks its RNG synchronously")]

use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Abstract environment providing time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Current time as a message date (`YYYY-MM-DDTHH:MM:SSZ`).
    fn message_date(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Production environment using the system clock and OS RNG.
///
/// # Panics
///
/// Panics if the OS RNG fails. Key generation without functioning
/// cryptographic randomness would produce guessable identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - cannot generate keys safely");
    }
}

/// Deterministic environment: pinned clock, seeded byte stream.
///
/// Two `FixedEnv`s with the same seed produce the same bytes in the same
/// order. Not suitable for real key generation.
#[derive(Debug)]
pub struct FixedEnv {
    now: DateTime<Utc>,
    rng: Mutex<ChaCha8Rng>,
}

impl FixedEnv {
    /// Create an environment pinned at `now` with the given RNG seed.
    pub fn new(now: DateTime<Utc>, seed: u64) -> Self {
        Self { now, rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)) }
    }

    /// Environment pinned at 2024-01-01T00:00:00Z.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(19_723), seed)
    }
}

impl Environment for FixedEnv {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().expect("Mutex poisoned").fill_bytes(buffer);
    }
}
