//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{PgpVaultError, Result};
use crate::vault::KeyVault;

/// Environment variable consulted before prompting for a passphrase.
pub const PASSPHRASE_ENV: &str = "PGPVAULT_PASSPHRASE";

/// PgpVault CLI: GnuPG-backed master keypair for a password store.
#[derive(Parser)]
#[command(
    name = "pgpvault",
    about = "GnuPG-backed master keypair for a password store",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Storage root holding the .keys file (default: .pgpvault)
    #[arg(long, env = "PGPVAULT_PATH", default_value = ".pgpvault", global = true)]
    pub path: String,

    /// gpg executable to use instead of the one on PATH
    #[arg(long, env = "PGPVAULT_GPG", global = true)]
    pub gpg: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate the store keypair
    Init {
        /// Replace an existing keypair
        #[arg(short, long)]
        force: bool,
    },

    /// Encrypt data for the store key
    Encrypt {
        /// Read plaintext from this file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Write armored ciphertext to this file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Decrypt data encrypted for the store key
    Decrypt {
        /// Read ciphertext from this file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Write plaintext to this file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check whether a passphrase unlocks the store key
    Check,

    /// Show the store keypair
    Keys,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the storage root from the CLI arguments.
///
/// Relative paths are taken from the current directory.
pub fn storage_root(cli: &Cli) -> Result<PathBuf> {
    let path = Path::new(&cli.path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

/// Open a vault over the storage root, honoring `--gpg` and the config file.
pub fn open_vault(cli: &Cli) -> Result<(KeyVault, Settings)> {
    let root = storage_root(cli)?;
    let settings = Settings::load(&root)?;
    let vault = match settings.resolve_gpg_binary(cli.gpg.as_deref().map(Path::new)) {
        Some(binary) => KeyVault::open_with_binary(&root, &binary)?,
        None => KeyVault::open(&root)?,
    };
    Ok((vault, settings))
}

/// Get the store passphrase, trying in order:
/// 1. `PGPVAULT_PASSPHRASE` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter passphrase")
        .interact()
        .map_err(|e| PgpVaultError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new passphrase with confirmation (used during `init`).
///
/// Also respects `PGPVAULT_PASSPHRASE` for scripted/CI usage.
/// Enforces a minimum length.
pub fn prompt_new_passphrase(min_len: usize) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            validate_new_passphrase(&pw, min_len)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let passphrase = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose passphrase")
                .with_confirmation("Confirm passphrase", "Passphrases do not match, try again")
                .interact()
                .map_err(|e| PgpVaultError::CommandFailed(format!("passphrase prompt: {e}")))?,
        );

        if let Err(e) = validate_new_passphrase(&passphrase, min_len) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(passphrase);
    }
}

/// Check a new passphrase against the length policy and gpg's
/// one-line passphrase input.
pub fn validate_new_passphrase(passphrase: &str, min_len: usize) -> Result<()> {
    if passphrase.chars().count() < min_len {
        return Err(PgpVaultError::CommandFailed(format!(
            "passphrase must be at least {min_len} characters"
        )));
    }
    if passphrase.contains(|c| c == '\n' || c == '\r') {
        return Err(PgpVaultError::CommandFailed(
            "passphrase must not contain line breaks".into(),
        ));
    }
    Ok(())
}

/// Read the whole payload from a file, or stdin when `path` is `None`.
pub fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write `data` to a file, or stdout when `path` is `None`.
pub fn write_output(path: Option<&str>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
