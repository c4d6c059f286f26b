use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PgpVaultError, Result};

/// Store-level configuration, loaded from `<storage_root>/.pgpvault.toml`.
///
/// Every field has a sensible default so PgpVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Explicit `gpg` executable. When unset, `gpg` is searched on `PATH`.
    #[serde(default)]
    pub gpg_binary: Option<PathBuf>,

    /// Minimum length enforced when choosing a new passphrase.
    #[serde(default = "default_min_passphrase_length")]
    pub min_passphrase_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_min_passphrase_length() -> usize {
    8
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            gpg_binary: None,
            min_passphrase_length: default_min_passphrase_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the storage root.
    pub const FILE_NAME: &'static str = ".pgpvault.toml";

    /// Load settings from `<storage_root>/.pgpvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(storage_root: &Path) -> Result<Self> {
        let config_path = storage_root.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PgpVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Pick the `gpg` executable: explicit override first, then config.
    ///
    /// `None` means "search `PATH`".
    pub fn resolve_gpg_binary(&self, cli_override: Option<&Path>) -> Option<PathBuf> {
        cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.gpg_binary.clone())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert!(s.gpg_binary.is_none());
        assert_eq!(s.min_passphrase_length, 8);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert!(settings.gpg_binary.is_none());
        assert_eq!(settings.min_passphrase_length, 8);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
gpg_binary = "/opt/gnupg/bin/gpg"
min_passphrase_length = 12
"#;
        fs::write(tmp.path().join(".pgpvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(
            settings.gpg_binary,
            Some(PathBuf::from("/opt/gnupg/bin/gpg"))
        );
        assert_eq!(settings.min_passphrase_length, 12);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pgpvault.toml"), "min_passphrase_length = 4\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.min_passphrase_length, 4);
        assert!(settings.gpg_binary.is_none());
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pgpvault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(PgpVaultError::ConfigError(_))));
    }

    #[test]
    fn cli_override_beats_config() {
        let s = Settings {
            gpg_binary: Some(PathBuf::from("/from/config/gpg")),
            ..Settings::default()
        };
        assert_eq!(
            s.resolve_gpg_binary(Some(Path::new("/from/cli/gpg"))),
            Some(PathBuf::from("/from/cli/gpg"))
        );
        assert_eq!(
            s.resolve_gpg_binary(None),
            Some(PathBuf::from("/from/config/gpg"))
        );
        assert_eq!(Settings::default().resolve_gpg_binary(None), None);
    }
}
