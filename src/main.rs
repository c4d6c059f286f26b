use clap::Parser;
use pgpvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `pgpvault=debug`).
const LOG_ENV: &str = "PGPVAULT_LOG";

fn main() {
    // Logs go to stderr; stdout carries encrypted/decrypted payloads.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => pgpvault::cli::commands::init::execute(&cli, force),
        Commands::Encrypt {
            ref input,
            ref output,
        } => pgpvault::cli::commands::encrypt::execute(&cli, input.as_deref(), output.as_deref()),
        Commands::Decrypt {
            ref input,
            ref output,
        } => pgpvault::cli::commands::decrypt::execute(&cli, input.as_deref(), output.as_deref()),
        Commands::Check => pgpvault::cli::commands::check::execute(&cli),
        Commands::Keys => pgpvault::cli::commands::keys::execute(&cli),
    };

    if let Err(e) = result {
        pgpvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
