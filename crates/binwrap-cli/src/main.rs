//! CLI entry point: logging, `.env` loading and dispatch.

use binwrap_cli::{Cli, CliError, handlers};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so BINWRAP_* defaults apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match handlers::dispatch(cli).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let err = CliError::from(err);
            eprintln!("Error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

/// Log to stderr so the wrapped binary's stdout stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "binwrap=debug" } else { "binwrap=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
