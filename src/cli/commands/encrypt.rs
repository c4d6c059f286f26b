//! `pgpvault encrypt` — encrypt a payload for the store key.

use crate::cli::{open_vault, read_input, write_output, Cli};
use crate::errors::Result;

/// Execute the `encrypt` command.
pub fn execute(cli: &Cli, input: Option<&str>, output: Option<&str>) -> Result<()> {
    let (vault, _) = open_vault(cli)?;

    let plaintext = read_input(input)?;
    let ciphertext = vault.encrypt(&plaintext)?;
    write_output(output, &ciphertext)?;

    vault.close()
}
