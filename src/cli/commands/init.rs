//! `pgpvault init` — generate the store keypair.

use std::fs;

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_passphrase, storage_root, Cli};
use crate::errors::{PgpVaultError, Result};

/// Execute the `init` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let root = storage_root(cli)?;

    // 1. Create the storage directory if it doesn't exist.
    if !root.exists() {
        fs::create_dir_all(&root)?;
        output::info(&format!("Created storage directory: {}", root.display()));
    }

    let (vault, settings) = open_vault(cli)?;

    // 2. Refuse early so the user is not asked for a passphrase in vain.
    if vault.has_keys() && !force {
        output::tip("Use `pgpvault init --force` to replace the existing keypair.");
        return Err(PgpVaultError::KeysAlreadyExist(vault.keys_path().to_path_buf()));
    }
    if force && vault.has_keys() {
        output::warning("Replacing the existing keypair; data encrypted for it becomes unreadable.");
    }

    // 3. Prompt for a new passphrase (with confirmation).
    let passphrase = prompt_new_passphrase(settings.min_passphrase_length)?;

    // 4. Generate and persist the keypair.
    output::info("Generating a 4096-bit RSA keypair, this can take a while...");
    let fingerprint = vault.create_keys(&passphrase, force)?;
    output::success(&format!(
        "Keypair {fingerprint} written to {}",
        vault.keys_path().display()
    ));

    output::tip("Run `pgpvault encrypt` to encrypt data for the store key.");
    output::tip("Run `pgpvault check` to verify your passphrase.");

    vault.close()
}
