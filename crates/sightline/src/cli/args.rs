//! CLI argument structs for all commands.

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser};
use std::path::PathBuf;

use super::validators::{parse_timestamp, validate_asset_id};

/// Lineage input shared by every command
#[derive(Args, Debug, Clone)]
pub struct LineageArgs {
    /// Lineage document (JSON with `nodes`, `edges` and `rootNode`)
    pub lineage: PathBuf,

    /// Analyze this asset instead of the document's `rootNode`
    #[arg(short, long, value_parser = validate_asset_id)]
    pub root: Option<String>,
}

/// Arguments for the `tiers` command
#[derive(Parser, Debug, Clone)]
pub struct TiersArgs {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub lineage: LineageArgs,

    /// Also print renderer coordinates for each asset
    #[arg(short, long)]
    pub positions: bool,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub lineage: LineageArgs,
}

/// Arguments for the `root-cause` command
#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("signals")
        .required(true)
        .args(["metadata", "health"]),
))]
pub struct RootCauseArgs {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub lineage: LineageArgs,

    /// Table metadata and job history (JSON keyed by asset ID)
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Precomputed health reports (JSON keyed by asset ID)
    #[arg(long, value_name = "FILE")]
    pub health: Option<PathBuf>,

    /// Maximum number of upstream hops to inspect
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Check the root asset as well
    #[arg(long)]
    pub include_root: bool,

    /// Health lookups in flight at once
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Evaluate metadata as of this time instead of now (RFC 3339)
    #[arg(long, value_parser = parse_timestamp, requires = "metadata")]
    pub as_of: Option<DateTime<Utc>>,
}
