//! GnuPG backend: drives the `gpg` executable against a private homedir.
//!
//! Every call runs `gpg --homedir <dir> --batch --no-tty --status-fd 2`
//! and reads the `[GNUPG:]` status lines from stderr to decide what
//! happened. Passphrases travel on stdin (`--passphrase-fd 0`) as the
//! first line, followed by the payload; they never appear in argv.

use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;
use zeroize::Zeroizing;

use super::listing::{
    created_fingerprint, has_status, parse_colon_listing, parse_status, StatusLine,
};
use super::{Fingerprint, KeyInfo, KeySpec, OpenPgpEngine};
use crate::errors::{PgpVaultError, Result};

/// Name of the GnuPG executable searched on `PATH`.
#[cfg(windows)]
const GPG_PROGRAM: &str = "gpg.exe";
#[cfg(not(windows))]
const GPG_PROGRAM: &str = "gpg";

#[cfg(windows)]
const GPGCONF_PROGRAM: &str = "gpgconf.exe";
#[cfg(not(windows))]
const GPGCONF_PROGRAM: &str = "gpgconf";

/// Agent configuration written into every private homedir.
///
/// Loopback pinentry lets passphrases arrive on stdin. A zero cache TTL
/// makes every passphrase check hit the key material again.
const AGENT_CONF: &str = "allow-loopback-pinentry\ndefault-cache-ttl 0\nmax-cache-ttl 0\n";

/// Arguments that route a passphrase through stdin.
const LOOPBACK_ARGS: [&str; 4] = ["--pinentry-mode", "loopback", "--passphrase-fd", "0"];

/// A `gpg` executable bound to one isolated homedir.
#[derive(Debug)]
pub struct GpgEngine {
    binary: PathBuf,
    homedir: PathBuf,
}

/// What a single `gpg` run produced.
struct GpgOutput {
    success: bool,
    stdout: Vec<u8>,
    status: Vec<StatusLine>,
    diagnostics: String,
}

impl GpgOutput {
    /// Build an engine error describing why `action` failed.
    fn failure(&self, action: &str) -> PgpVaultError {
        let detail = if self.diagnostics.is_empty() {
            self.status
                .iter()
                .map(|s| s.keyword.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            self.diagnostics.clone()
        };
        PgpVaultError::Engine(format!("{action} failed: {detail}"))
    }

    fn has(&self, keyword: &str) -> bool {
        has_status(&self.status, keyword)
    }
}

impl GpgEngine {
    /// Bind `binary` to `homedir`, preparing the homedir's agent config.
    pub fn new(binary: impl Into<PathBuf>, homedir: &Path) -> Result<Self> {
        fs::write(homedir.join("gpg-agent.conf"), AGENT_CONF)?;
        Ok(Self {
            binary: binary.into(),
            homedir: homedir.to_path_buf(),
        })
    }

    /// Find `gpg` on `PATH` and bind it to `homedir`.
    pub fn locate(homedir: &Path) -> Result<Self> {
        let binary = locate_executable(GPG_PROGRAM)?;
        debug!(binary = %binary.display(), "located gpg");
        Self::new(binary, homedir)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--homedir")
            .arg(&self.homedir)
            .args(["--batch", "--no-tty", "--status-fd", "2"])
            .env_remove("GNUPGHOME");
        cmd
    }

    /// Run gpg with `args`, feeding `input` on stdin.
    ///
    /// Stdin is written from a separate thread so a large payload cannot
    /// deadlock against gpg filling its stdout pipe.
    fn run<I, S>(&self, args: I, input: Zeroizing<Vec<u8>>) -> Result<GpgOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(command = ?cmd, "running gpg");

        let mut child = cmd.spawn().map_err(|e| {
            PgpVaultError::Engine(format!("failed to start {}: {e}", self.binary.display()))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PgpVaultError::Engine("cannot open gpg stdin".into()))?;
        let writer = std::thread::spawn(move || {
            let result = stdin.write_all(&input);
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .map_err(|e| PgpVaultError::Engine(format!("waiting for gpg: {e}")))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // gpg may stop reading early (e.g. bad passphrase); the exit
            // status and status lines carry the real outcome.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(PgpVaultError::Engine(format!("writing to gpg: {e}"))),
            Err(_) => return Err(PgpVaultError::Engine("gpg input writer panicked".into())),
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let (status, diagnostics) = parse_status(&stderr);
        debug!(
            success = output.status.success(),
            status = ?status.iter().map(|s| s.keyword.as_str()).collect::<Vec<_>>(),
            "gpg finished"
        );

        Ok(GpgOutput {
            success: output.status.success(),
            stdout: output.stdout,
            status,
            diagnostics,
        })
    }
}

impl OpenPgpEngine for GpgEngine {
    fn generate_key(&self, spec: &KeySpec, passphrase: &str) -> Result<Fingerprint> {
        check_single_line(passphrase)?;
        let params = spec.batch_parameters(passphrase);
        // The agent caches nothing, so the self-signature needs the
        // passphrase through loopback as well as in the parameter block.
        let mut args: Vec<&str> = LOOPBACK_ARGS.to_vec();
        args.push("--gen-key");
        let out = self.run(args, passphrase_input(passphrase, params.as_bytes()))?;

        match created_fingerprint(&out.status) {
            Some(fingerprint) if out.success => Ok(fingerprint),
            _ => Err(out.failure("key generation")),
        }
    }

    fn export_key(&self, fingerprint: &Fingerprint, secret: Option<&str>) -> Result<String> {
        let out = match secret {
            None => self.run(
                ["--armor", "--export", fingerprint.as_str()],
                Zeroizing::new(Vec::new()),
            )?,
            Some(passphrase) => {
                check_single_line(passphrase)?;
                let mut args: Vec<&str> = LOOPBACK_ARGS.to_vec();
                args.extend(["--armor", "--export-secret-keys", fingerprint.as_str()]);
                self.run(args, passphrase_input(passphrase, &[]))?
            }
        };

        if !out.success || out.stdout.is_empty() {
            return Err(out.failure(&format!("exporting key {fingerprint}")));
        }
        into_text(out.stdout)
    }

    fn import_keys(&self, armored: &str) -> Result<()> {
        let out = self.run(["--import"], Zeroizing::new(armored.as_bytes().to_vec()))?;

        // Re-importing a key already in the keyring exits non-zero on some
        // versions while still reporting IMPORT_OK.
        if out.success || out.has("IMPORT_OK") {
            Ok(())
        } else {
            Err(out.failure("key import"))
        }
    }

    fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let out = self.run(
            ["--with-colons", "--fixed-list-mode", "--list-keys"],
            Zeroizing::new(Vec::new()),
        )?;
        if !out.success {
            return Err(out.failure("key listing"));
        }
        Ok(parse_colon_listing(&String::from_utf8_lossy(&out.stdout)))
    }

    fn encrypt(&self, data: &[u8], recipient: &Fingerprint) -> Result<String> {
        let out = self.run(
            [
                "--armor",
                "--trust-model",
                "always",
                "--recipient",
                recipient.as_str(),
                "--encrypt",
            ],
            Zeroizing::new(data.to_vec()),
        )?;

        if !out.success || out.has("INV_RECP") {
            return Err(out.failure("encryption"));
        }
        into_text(out.stdout)
    }

    fn decrypt(&self, data: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        check_single_line(passphrase)?;
        let mut args: Vec<&str> = LOOPBACK_ARGS.to_vec();
        args.push("--decrypt");
        let out = self.run(args, passphrase_input(passphrase, data))?;

        if out.has("BAD_PASSPHRASE") {
            return Err(PgpVaultError::WrongPassphrase);
        }
        if !out.success || out.has("DECRYPTION_FAILED") {
            return Err(out.failure("decryption"));
        }
        Ok(out.stdout)
    }

    fn sign(&self, data: &[u8], key: &Fingerprint, passphrase: &str) -> Result<Option<String>> {
        check_single_line(passphrase)?;
        let mut args: Vec<&str> = LOOPBACK_ARGS.to_vec();
        args.extend(["--armor", "--local-user", key.as_str(), "--detach-sign"]);
        let out = self.run(args, passphrase_input(passphrase, data))?;

        if out.success && out.has("SIG_CREATED") {
            return into_text(out.stdout).map(Some);
        }
        debug!(diagnostics = %out.diagnostics, "gpg refused to sign");
        Ok(None)
    }

    fn shutdown(&self) -> Result<()> {
        let gpgconf = self.binary.with_file_name(GPGCONF_PROGRAM);
        if !gpgconf.is_file() {
            return Ok(());
        }

        let output = Command::new(&gpgconf)
            .arg("--homedir")
            .arg(&self.homedir)
            .args(["--kill", "gpg-agent"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PgpVaultError::Engine(format!("failed to start gpgconf: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PgpVaultError::Engine(format!(
                "gpgconf --kill gpg-agent failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// Find `program` on `PATH`.
pub fn locate_executable(program: &str) -> Result<PathBuf> {
    which::which(program)
        .map_err(|e| PgpVaultError::EngineNotFound(format!("`{program}` is not on PATH: {e}")))
}

/// gpg reads exactly one line from the passphrase fd.
fn check_single_line(passphrase: &str) -> Result<()> {
    if passphrase.contains(|c| c == '\n' || c == '\r') {
        return Err(PgpVaultError::Engine(
            "passphrase must not contain line breaks".into(),
        ));
    }
    Ok(())
}

/// Stdin for a loopback call: the passphrase line, then the payload.
fn passphrase_input(passphrase: &str, payload: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut input = Zeroizing::new(Vec::with_capacity(passphrase.len() + 1 + payload.len()));
    input.extend_from_slice(passphrase.as_bytes());
    input.push(b'\n');
    input.extend_from_slice(payload);
    input
}

fn into_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| PgpVaultError::Engine("gpg produced non-UTF-8 armored output".into()))
}
