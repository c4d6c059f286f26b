use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PgpVault.
#[derive(Debug, Error)]
pub enum PgpVaultError {
    // --- Keyring errors ---
    #[error("No keys found at {0} — run `pgpvault init` first")]
    KeysNotFound(PathBuf),

    #[error("Keys already exist at {0} (use --force to overwrite)")]
    KeysAlreadyExist(PathBuf),

    #[error("Wrong passphrase")]
    WrongPassphrase,

    // --- Engine errors ---
    #[error("OpenPGP engine error: {0}")]
    Engine(String),

    #[error("OpenPGP engine not found: {0}")]
    EngineNotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for PgpVault results.
pub type Result<T> = std::result::Result<T, PgpVaultError>;
