//! `pgpvault decrypt` — decrypt a payload with the store key.

use zeroize::Zeroizing;

use crate::cli::{open_vault, prompt_passphrase, read_input, write_output, Cli};
use crate::errors::{PgpVaultError, Result};

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, input: Option<&str>, output: Option<&str>) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    // Fail on a missing keyring before asking for anything.
    if !vault.has_keys() {
        return Err(PgpVaultError::KeysNotFound(vault.keys_path().to_path_buf()));
    }

    let ciphertext = read_input(input)?;
    let passphrase = prompt_passphrase()?;
    let plaintext = Zeroizing::new(vault.decrypt(&ciphertext, &passphrase)?);
    write_output(output, &plaintext)?;

    vault.close()
}
