//! Vault module — the store's master keypair.
//!
//! This module provides:
//! - The persisted `.keys` file (`keyring_file`)
//! - High-level `KeyVault` for creating keys, encrypting, decrypting,
//!   and checking passphrases (`store`)

pub mod keyring_file;
pub mod store;

// Re-export the most commonly used items.
pub use keyring_file::{keys_path, KEYS_FILE_NAME};
pub use store::KeyVault;
