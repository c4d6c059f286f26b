//! Parsers for GnuPG's machine-readable output.
//!
//! Two formats are handled:
//! - `--with-colons` key listings (`pub`, `fpr`, `uid` records)
//! - `--status-fd` lines (`[GNUPG:] KEYWORD args...`)

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{Fingerprint, KeyInfo};

/// Prefix GnuPG puts in front of every status line.
const STATUS_PREFIX: &str = "[GNUPG:] ";

/// A single `[GNUPG:]` status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub keyword: String,
    pub args: Vec<String>,
}

/// Split GnuPG's status/diagnostic stream into status lines and the rest.
///
/// Diagnostics (human-readable messages) are returned joined so they can be
/// surfaced in error messages.
pub fn parse_status(stream: &str) -> (Vec<StatusLine>, String) {
    let mut status = Vec::new();
    let mut diagnostics = Vec::new();

    for line in stream.lines() {
        match line.strip_prefix(STATUS_PREFIX) {
            Some(rest) => {
                let mut parts = rest.split_whitespace().map(str::to_string);
                if let Some(keyword) = parts.next() {
                    status.push(StatusLine {
                        keyword,
                        args: parts.collect(),
                    });
                }
            }
            None if !line.trim().is_empty() => diagnostics.push(line.trim()),
            None => {}
        }
    }

    (status, diagnostics.join("; "))
}

/// Returns `true` if any status line carries `keyword`.
pub fn has_status(status: &[StatusLine], keyword: &str) -> bool {
    status.iter().any(|s| s.keyword == keyword)
}

/// Find the fingerprint reported by `KEY_CREATED <type> <fingerprint>`.
pub fn created_fingerprint(status: &[StatusLine]) -> Option<Fingerprint> {
    status
        .iter()
        .find(|s| s.keyword == "KEY_CREATED")
        .and_then(|s| s.args.get(1))
        .map(|hex| Fingerprint::new(hex))
}

/// Parse a `--with-colons --fixed-list-mode` key listing.
///
/// Only primary keys (`pub`/`sec`) produce entries; the first `fpr` and
/// `uid` records after each primary key belong to it. Subkey fingerprints
/// are skipped.
pub fn parse_colon_listing(listing: &str) -> Vec<KeyInfo> {
    let mut keys: Vec<KeyInfo> = Vec::new();
    // Pending primary key: (created_at, fingerprint, user_id).
    let mut pending: Option<(Option<DateTime<Utc>>, Option<Fingerprint>, Option<String>)> = None;
    let mut in_subkey = false;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.first().copied() {
            Some("pub" | "sec") => {
                flush(&mut pending, &mut keys);
                in_subkey = false;
                pending = Some((parse_timestamp(field(&fields, 5)), None, None));
            }
            Some("sub" | "ssb") => in_subkey = true,
            Some("fpr") if !in_subkey => {
                if let Some((_, fpr @ None, _)) = pending.as_mut() {
                    let hex = field(&fields, 9);
                    if !hex.is_empty() {
                        *fpr = Some(Fingerprint::new(hex));
                    }
                }
            }
            Some("uid") if !in_subkey => {
                if let Some((_, _, uid @ None)) = pending.as_mut() {
                    *uid = Some(unescape(field(&fields, 9)));
                }
            }
            _ => {}
        }
    }
    flush(&mut pending, &mut keys);

    keys
}

fn flush(
    pending: &mut Option<(Option<DateTime<Utc>>, Option<Fingerprint>, Option<String>)>,
    keys: &mut Vec<KeyInfo>,
) {
    if let Some((created_at, Some(fingerprint), user_id)) = pending.take() {
        keys.push(KeyInfo {
            fingerprint,
            user_id,
            created_at,
        });
    }
}

fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or_default()
}

/// Creation dates are seconds since the epoch, or ISO 8601 basic format
/// (`20240101T120000`) with `--fixed-list-mode` on some builds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode the `\xHH` escapes GnuPG uses in colon listings.
fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && bytes[i + 1] == b'x' {
            let hex = std::str::from_utf8(&bytes[i + 2..i + 4]).unwrap_or_default();
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
