//! High-level key vault operations used by CLI commands.
//!
//! `KeyVault` wraps the persisted keyring file and an OpenPGP engine so
//! that the rest of the application can work with simple method calls
//! like `vault.encrypt(b"...")`.
//!
//! Every operation re-imports `<storage_root>/.keys` into a private
//! scratch keyring before touching the engine. The scratch directory
//! lives exactly as long as the vault.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::engine::{Fingerprint, GpgEngine, KeyInfo, KeySpec, OpenPgpEngine};
use crate::errors::{PgpVaultError, Result};

use super::keyring_file;

/// Data signed to prove a passphrase unlocks the secret key.
const PASSPHRASE_CHECK_MESSAGE: &[u8] = b"testing";

/// The main vault handle. Create one with `KeyVault::open` (GnuPG) or
/// `KeyVault::with_engine`, then use its methods to manage the keypair.
pub struct KeyVault<E: OpenPgpEngine = GpgEngine> {
    /// Path to the persisted keyring (`<storage_root>/.keys`).
    keys_path: PathBuf,

    /// The engine bound to the scratch keyring.
    engine: E,

    /// Location of the scratch keyring, kept after `workdir` is taken.
    workdir_path: PathBuf,

    /// Scratch keyring directory, removed on drop.
    workdir: Option<TempDir>,
}

impl KeyVault<GpgEngine> {
    /// Open a vault over `storage_root` using the `gpg` found on `PATH`.
    pub fn open(storage_root: &Path) -> Result<Self> {
        Self::with_engine(storage_root, GpgEngine::locate)
    }

    /// Open a vault over `storage_root` using a specific `gpg` executable.
    pub fn open_with_binary(storage_root: &Path, gpg_binary: &Path) -> Result<Self> {
        Self::with_engine(storage_root, |homedir| GpgEngine::new(gpg_binary, homedir))
    }
}

impl<E: OpenPgpEngine> KeyVault<E> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a fresh scratch keyring and bind an engine to it.
    ///
    /// `make_engine` receives the scratch directory path. If it fails, the
    /// scratch directory is removed before the error is returned.
    pub fn with_engine<F>(storage_root: &Path, make_engine: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> Result<E>,
    {
        let workdir = tempfile::Builder::new().prefix("pgpvault-").tempdir()?;
        let workdir_path = workdir.path().to_path_buf();
        let engine = make_engine(&workdir_path)?;

        debug!(
            storage_root = %storage_root.display(),
            workdir = %workdir_path.display(),
            "opened key vault"
        );

        Ok(Self {
            keys_path: keyring_file::keys_path(storage_root),
            engine,
            workdir_path,
            workdir: Some(workdir),
        })
    }

    /// Shut the engine down and remove the scratch keyring, reporting
    /// a failed removal instead of only logging it.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let Some(workdir) = self.workdir.take() else {
            return Ok(());
        };

        if let Err(e) = self.engine.shutdown() {
            debug!(error = %e, "engine shutdown failed");
        }

        workdir.close()?;
        debug!(workdir = %self.workdir_path.display(), "removed scratch keyring");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Key lifecycle
    // ------------------------------------------------------------------

    /// Generate the store's keypair and persist it to `.keys`.
    ///
    /// Refuses with `KeysAlreadyExist` when a keyring is present and
    /// `overwrite` is false; nothing is generated or written in that case.
    pub fn create_keys(&self, passphrase: &str, overwrite: bool) -> Result<Fingerprint> {
        if !overwrite && self.keys_path.exists() {
            return Err(PgpVaultError::KeysAlreadyExist(self.keys_path.clone()));
        }

        let spec = KeySpec::store_default();
        let fingerprint = self.engine.generate_key(&spec, passphrase)?;

        let public = self.engine.export_key(&fingerprint, None)?;
        let secret = self.engine.export_key(&fingerprint, Some(passphrase))?;
        keyring_file::write_keyring(&self.keys_path, &public, &secret)?;

        info!(
            fingerprint = %fingerprint,
            path = %self.keys_path.display(),
            "created store keypair"
        );
        Ok(fingerprint)
    }

    /// Load the persisted keyring into the scratch keyring.
    fn import_keys(&self) -> Result<()> {
        let armored = keyring_file::read_keyring(&self.keys_path)?;
        self.engine.import_keys(&armored)
    }

    /// Fingerprint of the first key in the scratch keyring.
    ///
    /// Only valid after `import_keys` succeeded.
    fn current_fingerprint(&self) -> Result<Fingerprint> {
        self.engine
            .list_keys()?
            .into_iter()
            .next()
            .map(|key| key.fingerprint)
            .ok_or_else(|| PgpVaultError::Engine("keyring is empty after import".into()))
    }

    /// Fingerprint of the store's key.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        self.import_keys()?;
        self.current_fingerprint()
    }

    /// Every key in the store's keyring, in engine order.
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        self.import_keys()?;
        self.engine.list_keys()
    }

    // ------------------------------------------------------------------
    // Payload operations
    // ------------------------------------------------------------------

    /// Encrypt `plaintext` for the store's key. Returns armored text bytes.
    ///
    /// Public-key operation: no passphrase involved.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.import_keys()?;
        let recipient = self.current_fingerprint()?;
        let armored = self.engine.encrypt(plaintext, &recipient)?;
        Ok(armored.into_bytes())
    }

    /// Decrypt `ciphertext` after confirming `passphrase` unlocks the key.
    ///
    /// A wrong passphrase fails with `WrongPassphrase` before any
    /// decryption is attempted.
    pub fn decrypt(&self, ciphertext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        self.import_keys()?;
        self.sign_check_message(passphrase, true)?;
        self.engine.decrypt(ciphertext, passphrase)
    }

    /// Check whether `passphrase` unlocks the store's secret key.
    ///
    /// With `ensure`, a wrong passphrase is an error (`WrongPassphrase`)
    /// rather than `Ok(false)`.
    pub fn check_passphrase(&self, passphrase: &str, ensure: bool) -> Result<bool> {
        self.import_keys()?;
        self.sign_check_message(passphrase, ensure)
    }

    /// Sign the check message; the signature itself is thrown away.
    fn sign_check_message(&self, passphrase: &str, ensure: bool) -> Result<bool> {
        let key = self.current_fingerprint()?;
        let unlocked = self
            .engine
            .sign(PASSPHRASE_CHECK_MESSAGE, &key, passphrase)?
            .is_some();

        if !unlocked && ensure {
            return Err(PgpVaultError::WrongPassphrase);
        }
        Ok(unlocked)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the persisted keyring.
    pub fn keys_path(&self) -> &Path {
        &self.keys_path
    }

    /// Returns `true` if the storage root already holds a keyring.
    pub fn has_keys(&self) -> bool {
        self.keys_path.exists()
    }

    /// Returns the scratch keyring directory.
    pub fn workdir(&self) -> &Path {
        &self.workdir_path
    }

    /// Returns the engine bound to the scratch keyring.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: OpenPgpEngine> Drop for KeyVault<E> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(
                workdir = %self.workdir_path.display(),
                error = %e,
                "failed to remove scratch keyring"
            );
        }
    }
}
