//! The persisted keyring file.
//!
//! A store keeps its keypair in `<storage_root>/.keys`: the armored
//! public key export followed by the armored secret key export. The
//! armor headers delimit the two blocks, so no separator is written.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::errors::{PgpVaultError, Result};

/// File name of the keyring inside a storage root.
pub const KEYS_FILE_NAME: &str = ".keys";

/// Build the keyring path for a storage root.
///
/// Example: `~/.pgpvault/.keys`
pub fn keys_path(storage_root: &Path) -> PathBuf {
    storage_root.join(KEYS_FILE_NAME)
}

/// Read the armored keyring, mapping a missing file to `KeysNotFound`.
pub fn read_keyring(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PgpVaultError::KeysNotFound(path.to_path_buf()))
        }
        Err(e) => Err(PgpVaultError::Io(e)),
    }
}

/// Write public then secret key material to `path` **atomically**.
///
/// 1. Create the parent directory if needed.
/// 2. Write to a fresh owner-only temp file in the same directory.
/// 3. Rename temp file over the target path.
///
/// Readers see either the old keyring or the new one, never a mix.
pub fn write_keyring(path: &Path, public_armored: &str, secret_armored: &str) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        "{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    // A leftover from an interrupted write; removing a symlink here
    // leaves its target alone.
    match fs::remove_file(&tmp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let mut contents = Zeroizing::new(String::with_capacity(
        public_armored.len() + secret_armored.len(),
    ));
    contents.push_str(public_armored);
    contents.push_str(secret_armored);

    let file = create_private(&tmp_path)?;
    let result =
        write_synced(file, contents.as_bytes()).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Create a new file readable only by its owner, refusing to reuse or
/// follow anything already at `path`.
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

fn write_synced(mut file: fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data)?;
    file.sync_all()
}
