//! `pgpvault check` — verify a passphrase against the store key.

use crate::cli::output;
use crate::cli::{open_vault, prompt_passphrase, Cli};
use crate::errors::{PgpVaultError, Result};

/// Execute the `check` command.
///
/// A wrong passphrase is reported as an error so the process exits non-zero.
pub fn execute(cli: &Cli) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    if !vault.has_keys() {
        return Err(PgpVaultError::KeysNotFound(vault.keys_path().to_path_buf()));
    }

    let passphrase = prompt_passphrase()?;
    let unlocked = vault.check_passphrase(&passphrase, false)?;
    vault.close()?;

    if !unlocked {
        return Err(PgpVaultError::WrongPassphrase);
    }
    output::success("Passphrase unlocks the store key");
    Ok(())
}
