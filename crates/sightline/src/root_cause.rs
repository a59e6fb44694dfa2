//! Upstream root-cause heuristic.
//!
//! When an asset looks wrong, the cause is usually somewhere upstream. This
//! module walks incoming edges from the root up to a bounded depth, asks a
//! [`HealthProvider`] about every asset it reaches, and reports the assets
//! that have at least one finding.
//!
//! # Ordering
//!
//! The set of assets to check is fixed by the traversal before any lookup
//! starts. Lookups then run concurrently, but results are collected through an
//! order-preserving buffered stream, so `suspicious_nodes` is always in
//! breadth-first discovery order no matter which lookup finishes first.
//!
//! # Degradation
//!
//! A lookup that fails or times out counts as "no issues" for that asset. It is
//! logged and never retried, and it never aborts the analysis.

use crate::domain::{AssetId, AssetNode, Freshness, Severity};
use crate::error::HealthError;
use crate::graph::LineageGraph;
use crate::graph::traversal::bfs_from_root;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of upstream hops to inspect.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default number of health lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default time allowed for a single health lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed job that touched an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    /// Job identifier
    pub job_id: String,
    /// When the job was created
    pub creation_time: DateTime<Utc>,
    /// Short error reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    /// Full error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Signals observed by a health collaborator, reported alongside findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedMetrics {
    /// Last modification time of the asset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Freshness bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness: Option<Freshness>,
    /// Current row count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_rows: Option<u64>,
    /// Recent failed jobs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_failures: Vec<JobFailure>,
}

/// What a health collaborator reports for one asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Human-readable findings; empty means healthy
    #[serde(default)]
    pub issues: Vec<String>,
    /// Severity suggested by the collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Observed signals, if the collaborator has any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ObservedMetrics>,
}

impl HealthReport {
    /// A healthy report with no findings.
    #[must_use]
    pub fn healthy() -> Self {
        Self::default()
    }

    /// A report with the given findings and severity.
    pub fn with_issues<I, S>(issues: I, severity: Severity) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            issues: issues.into_iter().map(Into::into).collect(),
            severity: Some(severity),
            metrics: None,
        }
    }
}

/// Source of health signals for individual assets.
///
/// Implementations typically call out to a metadata service, so lookups are
/// async. Implementations must be `Send + Sync` so lookups can run
/// concurrently.
#[async_trait]
pub trait HealthProvider: Send + Sync {
    /// Report the health of one asset.
    ///
    /// # Errors
    ///
    /// Any error is treated by the caller as "no issues" for this asset.
    async fn health(&self, node: &AssetNode) -> Result<HealthReport, HealthError>;
}

/// Options for [`find_suspicious_upstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCauseOptions {
    /// Maximum number of upstream hops to inspect
    pub max_depth: usize,
    /// Whether the root itself is checked as well
    pub include_root: bool,
    /// Health lookups allowed in flight at once (values below 1 act as 1)
    pub concurrency: usize,
    /// Time limit per lookup; `None` waits indefinitely
    ///
    /// A limit needs a tokio runtime with the time driver enabled.
    pub lookup_timeout: Option<Duration>,
}

impl Default for RootCauseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_root: false,
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout: Some(DEFAULT_LOOKUP_TIMEOUT),
        }
    }
}

/// An upstream asset with at least one finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousNode {
    /// The asset
    pub node: AssetNode,
    /// Upstream hops from the root (0 only when the root itself is checked)
    pub depth: usize,
    /// Findings in the order the collaborator reported them
    pub issues: Vec<String>,
    /// Collaborator-supplied severity, `info` when none was given
    pub severity: Severity,
    /// Observed signals
    #[serde(flatten)]
    pub metrics: ObservedMetrics,
}

/// Result of a root-cause analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCauseResult {
    /// Asset the analysis started from
    pub root: AssetId,
    /// Assets with findings, in breadth-first discovery order
    pub suspicious_nodes: Vec<SuspiciousNode>,
    /// Number of assets looked up, including healthy ones
    pub analyzed_nodes: usize,
    /// Short summary for humans
    pub recommendation: String,
}

impl RootCauseResult {
    /// First suspicious node with critical severity, in discovery order.
    #[must_use]
    pub fn first_critical(&self) -> Option<&SuspiciousNode> {
        first_critical(&self.suspicious_nodes)
    }
}

fn first_critical(suspicious: &[SuspiciousNode]) -> Option<&SuspiciousNode> {
    suspicious
        .iter()
        .find(|node| node.severity == Severity::Critical)
}

/// Walk upstream from the graph's root and collect assets with findings.
///
/// Never fails: collaborator errors and timeouts degrade to "no issues".
///
/// With a `lookup_timeout` set (the default) this must be polled inside a
/// tokio runtime that has the time driver enabled, otherwise the timer
/// panics. Set `lookup_timeout: None` to run on any executor.
pub async fn find_suspicious_upstream<P>(
    graph: &LineageGraph,
    options: &RootCauseOptions,
    provider: &P,
) -> RootCauseResult
where
    P: HealthProvider + ?Sized,
{
    let mut candidates = Vec::new();
    if options.include_root {
        candidates.push((graph.root_index(), 0));
    }
    candidates.extend(
        bfs_from_root(graph, Direction::Incoming, Some(options.max_depth))
            .into_iter()
            .map(|visit| (visit.index, visit.depth)),
    );

    let analyzed_nodes = candidates.len();
    let timeout = options.lookup_timeout;

    let reports: Vec<_> = stream::iter(candidates)
        .map(|(index, depth)| async move {
            let node = graph.node_at(index);
            let report = lookup(provider, node, timeout).await;
            (node, depth, report)
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

    let suspicious_nodes: Vec<SuspiciousNode> = reports
        .into_iter()
        .filter(|(_, _, report)| !report.issues.is_empty())
        .map(|(node, depth, report)| SuspiciousNode {
            node: node.clone(),
            depth,
            issues: report.issues,
            severity: report.severity.unwrap_or_default(),
            metrics: report.metrics.unwrap_or_default(),
        })
        .collect();

    let recommendation = recommend(analyzed_nodes, &suspicious_nodes);

    tracing::debug!(
        root = %graph.root_id(),
        analyzed = analyzed_nodes,
        suspicious = suspicious_nodes.len(),
        max_depth = options.max_depth,
        "Root-cause analysis complete"
    );

    RootCauseResult {
        root: graph.root_id().clone(),
        suspicious_nodes,
        analyzed_nodes,
        recommendation,
    }
}

async fn lookup<P>(provider: &P, node: &AssetNode, timeout: Option<Duration>) -> HealthReport
where
    P: HealthProvider + ?Sized,
{
    tracing::trace!(asset = %node.id, "Requesting health signals");

    let outcome = match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.health(node))
            .await
            .unwrap_or_else(|_| Err(HealthError::Timeout(limit))),
        None => provider.health(node).await,
    };

    outcome.unwrap_or_else(|error| {
        tracing::warn!(
            asset = %node.id,
            error = %error,
            "Health lookup failed, treating asset as healthy"
        );
        HealthReport::healthy()
    })
}

fn recommend(analyzed: usize, suspicious: &[SuspiciousNode]) -> String {
    let summary = format!(
        "Analyzed {analyzed} upstream tables, found {} potential issues.",
        suspicious.len()
    );

    let guidance = if suspicious.is_empty() {
        "No obvious upstream issues detected. The problem may be in the transformation logic or external factors.".to_string()
    } else if let Some(critical) = first_critical(suspicious) {
        format!(
            "Start by investigating '{}'. It has critical issues that are likely propagating downstream.",
            critical.node.display_label()
        )
    } else {
        "Check the flagged upstream tables. Issues may be cascading from multiple sources."
            .to_string()
    };

    format!("{summary} {guidance}")
}
