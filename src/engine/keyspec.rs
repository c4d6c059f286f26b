//! Key generation policy for a store's master keypair.
//!
//! Every store gets the same shape of key: a 4096-bit RSA primary key
//! for signing and certification, a 4096-bit RSA subkey for encryption,
//! a fixed identity, and no expiry.

use std::fmt::Write;

use zeroize::Zeroizing;

/// Parameters for generating a keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub key_type: &'static str,
    pub key_length: u32,
    pub subkey_type: &'static str,
    pub subkey_length: u32,
    pub name_real: &'static str,
    pub name_comment: &'static str,
    pub name_email: &'static str,

    /// `0` means the key never expires.
    pub expire_date: &'static str,
}

impl KeySpec {
    /// The policy used for every store keypair.
    pub const fn store_default() -> Self {
        Self {
            key_type: "RSA",
            key_length: 4096,
            subkey_type: "RSA",
            subkey_length: 4096,
            name_real: "pgpvault",
            name_comment: "Auto-generated by pgpvault",
            name_email: "pgpvault@local",
            expire_date: "0",
        }
    }

    /// The user id string the engine will attach to the key.
    pub fn user_id(&self) -> String {
        format!(
            "{} ({}) <{}>",
            self.name_real, self.name_comment, self.name_email
        )
    }

    /// Render a GnuPG unattended key generation parameter block.
    ///
    /// The block carries the passphrase, so it is returned zeroizing.
    pub fn batch_parameters(&self, passphrase: &str) -> Zeroizing<String> {
        let mut params = Zeroizing::new(String::with_capacity(256));
        let _ = writeln!(params, "Key-Type: {}", self.key_type);
        let _ = writeln!(params, "Key-Length: {}", self.key_length);
        let _ = writeln!(params, "Key-Usage: sign,cert");
        let _ = writeln!(params, "Subkey-Type: {}", self.subkey_type);
        let _ = writeln!(params, "Subkey-Length: {}", self.subkey_length);
        let _ = writeln!(params, "Subkey-Usage: encrypt");
        let _ = writeln!(params, "Name-Real: {}", self.name_real);
        let _ = writeln!(params, "Name-Comment: {}", self.name_comment);
        let _ = writeln!(params, "Name-Email: {}", self.name_email);
        let _ = writeln!(params, "Expire-Date: {}", self.expire_date);
        let _ = writeln!(params, "Passphrase: {passphrase}");
        params.push_str("%commit\n");
        params
    }
}

impl Default for KeySpec {
    fn default() -> Self {
        Self::store_default()
    }
}
