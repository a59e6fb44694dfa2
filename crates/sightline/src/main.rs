//! Sightline CLI binary.

use anyhow::Result;
use sightline::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the sightline CLI.
///
/// Uses tokio's current_thread runtime: health lookups overlap on I/O, not CPU.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    // Example: RUST_LOG=sightline=debug sightline impact lineage.json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sightline=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting sightline CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Sightline CLI completed successfully");
    Ok(())
}
