//! Output formatting for CLI commands.
//!
//! Every report can be printed as human-readable text or as JSON for
//! programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - `json`: JSON report shapes
//! - `tree`: Tree rendering with ASCII/Unicode connectors

pub mod color;
mod json;
mod tree;

use crate::domain::AssetId;
use crate::graph::LineageGraph;
use crate::impact::{AffectedAsset, ImpactResult};
use crate::layout::{NodePosition, Tiers};
use crate::root_cause::{RootCauseResult, SuspiciousNode};
use chrono::Utc;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::success;

use color::{bold, colorize_id, colorize_risk, colorize_severity, dimmed, severity_icon};
use json::{ImpactReport, RootCauseReport, TiersReport};
use tree::{TreeNode, write_tree};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: usize = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 100;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons and connectors.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `SIGHTLINE_MAX_WIDTH`: Maximum content width (default: 100)
    /// - `SIGHTLINE_ASCII`: Set to "1" or "true" for ASCII-only output
    /// - `NO_COLOR`: Any value disables colors
    /// - `SIGHTLINE_COLOR`: Set to "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("SIGHTLINE_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "SIGHTLINE_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match env::var("SIGHTLINE_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "SIGHTLINE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("SIGHTLINE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    fn content_width(&self) -> usize {
        let terminal_width = terminal_size::terminal_size()
            .map_or(DEFAULT_TERMINAL_WIDTH, |(w, _)| usize::from(w.0));
        terminal_width.min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print the tier assignment for a graph, with coordinates when given.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_tiers(
    graph: &LineageGraph,
    tiers: &Tiers,
    positions: Option<&[NodePosition]>,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_tiers_text(&mut handle, graph, tiers, &config)?;
            match positions {
                Some(positions) => write_positions_text(&mut handle, positions, &config),
                None => Ok(()),
            }
        }
        OutputMode::Json => write_json(
            &mut handle,
            &TiersReport::new(graph.root_id(), tiers, positions, graph.warnings()),
        ),
    }
}

/// Print an impact analysis result.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_impact(result: &ImpactResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_impact_text(&mut handle, result, &OutputConfig::from_env()),
        OutputMode::Json => write_json(
            &mut handle,
            &ImpactReport {
                result,
                recommended_actions: result.recommended_actions(),
            },
        ),
    }
}

/// Print a root-cause analysis result.
///
/// The JSON form is stamped with the time it was produced.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_root_cause(result: &RootCauseResult, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_root_cause_text(&mut handle, result, &OutputConfig::from_env()),
        OutputMode::Json => write_json(
            &mut handle,
            &RootCauseReport {
                result,
                timestamp: Utc::now(),
            },
        ),
    }
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    textwrap::wrap(text, max_width.max(20))
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn tier_label(tier: i32) -> String {
    match tier.signum() {
        -1 => format!("tier {tier} (upstream)"),
        1 => format!("tier +{tier} (downstream)"),
        _ => "tier 0".to_string(),
    }
}

fn write_tiers_text<W: Write>(
    w: &mut W,
    graph: &LineageGraph,
    tiers: &Tiers,
    config: &OutputConfig,
) -> io::Result<()> {
    let groups: Vec<TreeNode> = tiers
        .by_tier()
        .into_iter()
        .map(|(tier, ids)| {
            let members = ids
                .into_iter()
                .map(|id| asset_line(graph, id, config))
                .collect::<Vec<_>>();
            TreeNode::new(bold(&tier_label(tier), config))
                .with_note(members.len().to_string())
                .with_children(members)
        })
        .collect();

    write_tree(w, graph.root_id().as_str(), &groups, config)?;

    let unreached = graph.node_count().saturating_sub(tiers.len());
    if unreached > 0 {
        writeln!(w)?;
        writeln!(
            w,
            "{}",
            dimmed(
                &format!("{unreached} asset(s) not connected to the root were left out."),
                config
            )
        )?;
    }
    Ok(())
}

fn write_positions_text<W: Write>(
    w: &mut W,
    positions: &[NodePosition],
    config: &OutputConfig,
) -> io::Result<()> {
    let id_width = positions
        .iter()
        .map(|p| p.id.as_str().len())
        .max()
        .unwrap_or(0);

    writeln!(w)?;
    writeln!(w, "{}:", bold("Positions", config))?;
    for position in positions {
        writeln!(
            w,
            "  {:<id_width$}  {}  {}",
            position.id.as_str(),
            dimmed(&format!("x={:>8.1}", position.x), config),
            dimmed(&format!("y={:>8.1}", position.y), config),
        )?;
    }
    Ok(())
}

fn asset_line(graph: &LineageGraph, id: &AssetId, config: &OutputConfig) -> TreeNode {
    let line = TreeNode::new(colorize_id(id.as_str(), config));
    match graph.node(id) {
        Some(node) => line.with_note(node.asset_type.to_string()),
        None => line,
    }
}

fn affected_line(asset: &AffectedAsset, config: &OutputConfig) -> TreeNode {
    TreeNode::new(colorize_id(asset.node.id.as_str(), config))
        .with_note(format!("depth {}", asset.depth))
}

fn write_impact_text<W: Write>(
    w: &mut W,
    result: &ImpactResult,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}  {} {}/100",
        dimmed("Risk:", config),
        colorize_risk(result.risk_level, config),
        dimmed("Score:", config),
        result.risk_score
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Affected assets:", config),
        result.total_affected,
        dimmed("Longest chain:", config),
        result.longest_chain
    )?;
    writeln!(w)?;

    if result.total_affected == 0 {
        writeln!(w, "No downstream assets depend on {}.", result.root)?;
    } else {
        let mut groups = Vec::new();
        if !result.direct_downstream.is_empty() {
            groups.push(
                TreeNode::new(bold("Direct", config))
                    .with_note(result.direct_downstream.len().to_string())
                    .with_children(
                        result
                            .direct_downstream
                            .iter()
                            .map(|asset| affected_line(asset, config))
                            .collect(),
                    ),
            );
        }
        if !result.indirect_downstream.is_empty() {
            groups.push(
                TreeNode::new(bold("Indirect", config))
                    .with_note(result.indirect_downstream.len().to_string())
                    .with_children(
                        result
                            .indirect_downstream
                            .iter()
                            .map(|asset| affected_line(asset, config))
                            .collect(),
                    ),
            );
        }
        write_tree(w, result.root.as_str(), &groups, config)?;
    }

    writeln!(w)?;
    writeln!(w, "{}:", bold("Recommended actions", config))?;
    for action in result.recommended_actions() {
        writeln!(w, "  - {action}")?;
    }
    Ok(())
}

fn write_suspicious<W: Write>(
    w: &mut W,
    suspect: &SuspiciousNode,
    width: usize,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {} {}",
        severity_icon(suspect.severity, config),
        colorize_id(suspect.node.id.as_str(), config),
        colorize_severity(suspect.severity, config),
        dimmed(&format!("(depth {})", suspect.depth), config)
    )?;
    for issue in &suspect.issues {
        for (i, line) in wrap_text(issue, width.saturating_sub(6)).iter().enumerate() {
            let bullet = if i == 0 { "-" } else { " " };
            writeln!(w, "    {bullet} {line}")?;
        }
    }
    if let Some(last_modified) = suspect.metrics.last_modified {
        writeln!(
            w,
            "    {} {}",
            dimmed("Last modified:", config),
            last_modified.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    if let Some(rows) = suspect.metrics.num_rows {
        writeln!(w, "    {} {rows}", dimmed("Rows:", config))?;
    }
    for failure in &suspect.metrics.job_failures {
        let reason = failure.error_reason.as_deref().unwrap_or("unknown");
        writeln!(
            w,
            "    {} {} {} ({reason})",
            dimmed("Failed job:", config),
            failure.job_id,
            failure.creation_time.format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

fn write_root_cause_text<W: Write>(
    w: &mut W,
    result: &RootCauseResult,
    config: &OutputConfig,
) -> io::Result<()> {
    let width = config.content_width();

    writeln!(
        w,
        "{} {}",
        bold("Root-cause analysis for", config),
        colorize_id(result.root.as_str(), config)
    )?;
    writeln!(w)?;

    if result.suspicious_nodes.is_empty() {
        writeln!(w, "{}", success("No suspicious upstream assets.", config))?;
    } else {
        for suspect in &result.suspicious_nodes {
            write_suspicious(w, suspect, width, config)?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}:", bold("Recommendation", config))?;
    for line in wrap_text(&result.recommendation, width.saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}
