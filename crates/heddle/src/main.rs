//! Heddle CLI binary.

use anyhow::Result;
use heddle::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Single-threaded runtime; every command is a short sequence of file I/O.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // RUST_LOG overrides, e.g. RUST_LOG=heddle=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("heddle=info,heddle_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting heddle CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Heddle CLI completed successfully");
    Ok(())
}
