//! Health-signal collaborators for root-cause analysis.
//!
//! The root-cause engine only knows the [`HealthProvider`] trait. This module
//! ships the implementations used by the CLI and by tests:
//!
//! - [`StaticHealthProvider`]: precomputed reports keyed by asset ID, with
//!   optional simulated failures
//! - [`MetadataHealthProvider`]: derives findings from table metadata and job
//!   history supplied by a [`MetadataSource`]
//! - [`StaticMetadataSource`]: in-memory metadata records, loadable from JSON
//!
//! # Example
//!
//! ```
//! use sightline::domain::{AssetId, AssetNode, DependencyEdge, Severity};
//! use sightline::graph::LineageGraph;
//! use sightline::health::StaticHealthProvider;
//! use sightline::root_cause::{find_suspicious_upstream, HealthReport, RootCauseOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let graph = LineageGraph::build(
//!         vec![AssetNode::table("p.raw.events"), AssetNode::table("p.mart.daily")],
//!         vec![DependencyEdge::new("p.raw.events", "p.mart.daily")],
//!         &AssetId::new("p.mart.daily"),
//!     )?;
//!
//!     let provider = StaticHealthProvider::new().with_report(
//!         "p.raw.events",
//!         HealthReport::with_issues(["Table is empty (0 rows)"], Severity::Critical),
//!     );
//!
//!     let options = RootCauseOptions::default();
//!     let result = find_suspicious_upstream(&graph, &options, &provider).await;
//!     assert_eq!(result.suspicious_nodes.len(), 1);
//!     Ok(())
//! }
//! ```

mod metadata;

pub use metadata::{
    HealthThresholds, MAX_REPORTED_FAILURES, MAX_THRESHOLD_HOURS, MetadataHealthProvider,
    MetadataRecord, MetadataSource, StaticMetadataSource, TableMetadata, classify_freshness,
    evaluate_metadata,
};

use crate::domain::{AssetId, AssetNode};
use crate::error::{HealthError, Result};
use crate::root_cause::{HealthProvider, HealthReport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Health provider answering from a fixed set of reports.
///
/// Assets without a report are healthy. Assets marked as failing return
/// [`HealthError::Unavailable`], which lets callers exercise degraded lookups.
///
/// The JSON form (used by `sightline root-cause --health`) is an object
/// mapping asset IDs to reports:
///
/// ```json
/// { "proj.raw.events": { "issues": ["stale"], "severity": "warning" } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticHealthProvider {
    reports: HashMap<AssetId, HealthReport>,
    failing: HashSet<AssetId>,
}

impl StaticHealthProvider {
    /// Create a provider that reports every asset as healthy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the report for an asset.
    #[must_use]
    pub fn with_report(mut self, id: impl Into<AssetId>, report: HealthReport) -> Self {
        self.reports.insert(id.into(), report);
        self
    }

    /// Make lookups for an asset fail.
    #[must_use]
    pub fn with_failure(mut self, id: impl Into<AssetId>) -> Self {
        self.failing.insert(id.into());
        self
    }

    /// Parse reports from a JSON object keyed by asset ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::Document` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let reports: HashMap<AssetId, HealthReport> = serde_json::from_str(json)?;
        Ok(Self {
            reports,
            failing: HashSet::new(),
        })
    }

    /// Load reports from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Document`
    /// if it is not valid JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    /// Number of assets with a stored report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no reports are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[async_trait]
impl HealthProvider for StaticHealthProvider {
    async fn health(&self, node: &AssetNode) -> std::result::Result<HealthReport, HealthError> {
        if self.failing.contains(&node.id) {
            return Err(HealthError::Unavailable(format!(
                "no health source for {}",
                node.id
            )));
        }
        Ok(self.reports.get(&node.id).cloned().unwrap_or_default())
    }
}
