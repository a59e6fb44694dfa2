//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for sightline using clap's
//! derive API.
//!
//! # Commands
//!
//! - `tiers`: Assign every connected asset a tier relative to the root
//! - `impact`: Estimate the downstream blast radius of changing the root
//! - `root-cause`: Look upstream for assets with health issues
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Read settings from this YAML file instead of `./sightline.yaml`
//!
//! # Example
//!
//! ```bash
//! sightline tiers lineage.json --positions
//! sightline impact lineage.json --root proj.sales.orders
//! sightline --json root-cause lineage.json --metadata metadata.json --max-depth 3
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{ImpactArgs, LineageArgs, RootCauseArgs, TiersArgs};
pub use validators::{parse_timestamp, validate_asset_id};

use crate::config::SightlineConfig;
use crate::output::OutputMode;

/// Sightline - lineage analysis for warehouse tables
///
/// Reads a lineage document exported from the data catalog and answers three
/// questions about its root asset: where does everything sit, what breaks if
/// it changes, and which upstream table is the likely culprit when it looks
/// wrong.
#[derive(Parser, Debug)]
#[command(name = "sightline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./sightline.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the tier of every asset connected to the root
    ///
    /// Upstream producers get negative tiers, downstream consumers positive
    /// ones. Use `--positions` to also print layout coordinates.
    Tiers(TiersArgs),

    /// Analyze the downstream impact of changing the root
    ///
    /// Lists direct and indirect dependents, the longest dependency chain,
    /// and a risk score with recommended actions.
    Impact(ImpactArgs),

    /// Find suspicious upstream assets
    ///
    /// Walks upstream from the root and checks each asset's health using
    /// either table metadata (`--metadata`) or precomputed reports
    /// (`--health`).
    RootCause(RootCauseArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, lineage document or health
    /// inputs cannot be loaded, or if writing output fails.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Sightline lineage analysis");
            println!("Use --help for more information");
            return Ok(());
        };

        let config = SightlineConfig::load_or_default(self.config.as_deref()).await?;

        match command {
            Commands::Tiers(args) => execute::execute_tiers(args, &config, output_mode).await,
            Commands::Impact(args) => execute::execute_impact(args, output_mode).await,
            Commands::RootCause(args) => {
                execute::execute_root_cause(args, &config, output_mode).await
            }
        }
    }
}
