//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command. Status messages go to
//! stderr so stdout stays clean for encrypted/decrypted payloads.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::engine::KeyInfo;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of keys (Fingerprint, User ID, Created).
pub fn print_keys_table(keys: &[KeyInfo]) {
    if keys.is_empty() {
        info("The keyring holds no keys.");
        tip("Run `pgpvault init --force` to generate a new keypair.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Fingerprint", "User ID", "Created"]);

    for k in keys {
        table.add_row(vec![
            k.fingerprint.to_string(),
            k.user_id.clone().unwrap_or_else(|| "-".to_string()),
            k.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{table}");
}
