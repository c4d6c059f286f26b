//! OpenPGP engine boundary.
//!
//! This module provides:
//! - The `OpenPgpEngine` trait every backend implements
//! - `Fingerprint` and `KeyInfo`, the values the engine hands back
//! - The fixed key generation policy (`keyspec`)
//! - A GnuPG backend driving the `gpg` executable (`gpg`)
//! - Parsers for GnuPG's machine-readable output (`listing`)

pub mod gpg;
pub mod keyspec;
pub mod listing;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::Result;

// Re-export the most commonly used items so callers can write:
//   use crate::engine::{GpgEngine, KeySpec, OpenPgpEngine};
pub use gpg::GpgEngine;
pub use keyspec::KeySpec;

/// Stable identifier of a keypair, stored as upper-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a hex fingerprint, normalizing case and stripping whitespace.
    pub fn new(hex: &str) -> Self {
        let normalized: String = hex
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One key as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub fingerprint: Fingerprint,

    /// Primary user id (e.g. `pgpvault (Auto-generated by pgpvault) <pgpvault@local>`).
    pub user_id: Option<String>,

    /// Key creation time, when the engine reports one.
    pub created_at: Option<DateTime<Utc>>,
}

/// The operations a vault needs from an OpenPGP implementation.
///
/// Implementations own an isolated keyring: keys imported into one engine
/// are never visible to another. All methods block until the engine is done.
pub trait OpenPgpEngine {
    /// Generate a new keypair following `spec`, protected by `passphrase`.
    fn generate_key(&self, spec: &KeySpec, passphrase: &str) -> Result<Fingerprint>;

    /// Export armored key material for `fingerprint`.
    ///
    /// `None` exports the public key. `Some(passphrase)` exports the
    /// secret key, unlocking it with the passphrase where the engine needs it.
    fn export_key(&self, fingerprint: &Fingerprint, secret: Option<&str>) -> Result<String>;

    /// Load armored key material into the isolated keyring.
    fn import_keys(&self, armored: &str) -> Result<()>;

    /// List the keys in the isolated keyring, in engine order.
    fn list_keys(&self) -> Result<Vec<KeyInfo>>;

    /// Encrypt `data` for the single recipient `recipient`, returning armored text.
    fn encrypt(&self, data: &[u8], recipient: &Fingerprint) -> Result<String>;

    /// Decrypt an armored or binary message with `passphrase`.
    fn decrypt(&self, data: &[u8], passphrase: &str) -> Result<Vec<u8>>;

    /// Produce a detached signature over `data` with `key`.
    ///
    /// Returns `Ok(None)` when the engine refuses to sign (wrong passphrase,
    /// no secret key). `Err` is reserved for the engine itself failing.
    fn sign(&self, data: &[u8], key: &Fingerprint, passphrase: &str) -> Result<Option<String>>;

    /// Release anything the engine keeps running for its keyring.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}
