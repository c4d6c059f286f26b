//! `pgpvault keys` — show the store keypair.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `keys` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    let keys = vault.list_keys()?;
    output::print_keys_table(&keys);
    output::tip(&format!("Keyring file: {}", vault.keys_path().display()));

    vault.close()
}
