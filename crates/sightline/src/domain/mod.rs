//! Domain types for lineage analysis.
//!
//! This module contains the core domain types shared by the graph model and
//! the analysis engines: asset identifiers, asset nodes, dependency edges and
//! the small enums used in analysis results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a data asset (typically `project.dataset.table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Create a new asset ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of the asset ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a fully qualified `project.dataset.table` ID into its parts.
    ///
    /// Returns `None` unless the ID has exactly three non-empty segments.
    #[must_use]
    pub fn table_ref(&self) -> Option<TableRef<'_>> {
        let mut parts = self.0.split('.');
        let project = parts.next()?;
        let dataset = parts.next()?;
        let table = parts.next()?;
        if parts.next().is_some() || project.is_empty() || dataset.is_empty() || table.is_empty()
        {
            return None;
        }
        Some(TableRef {
            project,
            dataset,
            table,
        })
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The three segments of a fully qualified warehouse table ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef<'a> {
    /// Owning project
    pub project: &'a str,
    /// Dataset within the project
    pub dataset: &'a str,
    /// Table name within the dataset
    pub table: &'a str,
}

/// Kind of warehouse object an asset represents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Physical table
    #[default]
    Table,

    /// Logical view
    View,

    /// Materialized view
    MaterializedView,

    /// Table backed by external storage
    External,
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetType::Table => "table",
            AssetType::View => "view",
            AssetType::MaterializedView => "materialized_view",
            AssetType::External => "external",
        };
        write!(f, "{s}")
    }
}

/// A data asset in the lineage graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetNode {
    /// Unique identifier for the asset
    pub id: AssetId,

    /// Display name (not used by any analysis)
    #[serde(default)]
    pub label: String,

    /// Owning dataset / namespace
    #[serde(default)]
    pub dataset_id: String,

    /// Kind of warehouse object
    #[serde(rename = "type", alias = "assetType", default)]
    pub asset_type: AssetType,
}

impl AssetNode {
    /// Create a table node whose label and dataset are derived from the ID.
    ///
    /// For `project.dataset.table` IDs the label is the table name and the
    /// dataset is the middle segment; any other ID is used verbatim as the
    /// label with an empty dataset.
    pub fn table(id: impl Into<AssetId>) -> Self {
        let id = id.into();
        let (label, dataset_id) = match id.table_ref() {
            Some(parts) => (parts.table.to_string(), parts.dataset.to_string()),
            None => (id.as_str().to_string(), String::new()),
        };
        Self {
            id,
            label,
            dataset_id,
            asset_type: AssetType::Table,
        }
    }

    /// Set the asset type
    #[must_use]
    pub fn with_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    /// Label to show for this node, falling back to the ID when empty.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }
}

/// Classification of a dependency relationship.
///
/// Carried through the graph for callers; no analysis interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Generic dependency reported by the catalog
    #[default]
    Dependency,

    /// Target reads from source
    Read,

    /// Source writes into target
    Write,

    /// Target is a view defined over source
    ViewDependency,

    /// Any classification this crate does not know about
    #[serde(other)]
    Other,
}

/// Directed dependency between two assets (data flows `source -> target`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Producer asset
    pub source: AssetId,

    /// Consumer asset
    pub target: AssetId,

    /// Relationship classification
    #[serde(rename = "type", alias = "edgeType", default)]
    pub kind: EdgeKind,
}

impl DependencyEdge {
    /// Create a generic dependency edge
    pub fn new(source: impl Into<AssetId>, target: impl Into<AssetId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Dependency,
        }
    }

    /// Set the edge classification
    #[must_use]
    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the edge points from an asset to itself
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Discrete risk tier derived from a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Score below 25
    Low,

    /// Score 25..50
    Medium,

    /// Score 50..80
    High,

    /// Score 80 and above
    Critical,
}

impl RiskLevel {
    /// Map a risk score to its tier (thresholds evaluated high to low).
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => RiskLevel::Critical,
            50..=79 => RiskLevel::High,
            25..=49 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Static recommended actions for this tier.
    #[must_use]
    pub fn recommended_actions(self) -> &'static [&'static str] {
        match self {
            RiskLevel::Low => &[
                "Proceed with the change using normal review",
                "Spot-check the direct consumers after deployment",
            ],
            RiskLevel::Medium => &[
                "Notify owners of the directly affected assets",
                "Validate downstream queries in a staging dataset",
                "Schedule the change outside peak reporting hours",
            ],
            RiskLevel::High => &[
                "Coordinate the change with all downstream owners",
                "Run downstream jobs against a copy before switching over",
                "Prepare a rollback plan and keep the previous schema available",
            ],
            RiskLevel::Critical => &[
                "Treat the change as a migration with a written plan",
                "Introduce the new shape alongside the old one and migrate consumers",
                "Monitor every affected asset for freshness and row-count drift",
                "Get sign-off from data platform owners before deploying",
            ],
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

/// Severity of a root-cause finding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Likely cause of downstream problems
    Critical,

    /// Worth checking
    Warning,

    /// Informational only
    #[default]
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{s}")
    }
}

/// Freshness bucket of an asset, based on time since its last modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Modified within the recent window
    Fresh,

    /// Older than the recent window but not yet stale
    Recent,

    /// Not modified within the stale window
    Stale,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Freshness::Fresh => "fresh",
            Freshness::Recent => "recent",
            Freshness::Stale => "stale",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero(0, RiskLevel::Low)]
    #[case::below_medium(24, RiskLevel::Low)]
    #[case::medium_floor(25, RiskLevel::Medium)]
    #[case::below_high(49, RiskLevel::Medium)]
    #[case::high_floor(50, RiskLevel::High)]
    #[case::below_critical(79, RiskLevel::High)]
    #[case::critical_floor(80, RiskLevel::Critical)]
    #[case::saturated(100, RiskLevel::Critical)]
    fn risk_level_thresholds(#[case] score: u8, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_score(score), expected);
    }

    #[test]
    fn every_risk_level_has_actions() {
        for level in [
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Critical,
        ] {
            assert!(!level.recommended_actions().is_empty());
        }
    }

    #[rstest]
    #[case::qualified("proj.sales.orders", Some(("proj", "sales", "orders")))]
    #[case::two_parts("sales.orders", None)]
    #[case::four_parts("a.b.c.d", None)]
    #[case::empty_segment("proj..orders", None)]
    fn table_ref_parsing(#[case] id: &str, #[case] expected: Option<(&str, &str, &str)>) {
        let id = AssetId::new(id);
        let parsed = id.table_ref().map(|r| (r.project, r.dataset, r.table));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn table_node_derives_label_and_dataset() {
        let node = AssetNode::table("proj.sales.orders");
        assert_eq!(node.label, "orders");
        assert_eq!(node.dataset_id, "sales");
        assert_eq!(node.asset_type, AssetType::Table);

        let bare = AssetNode::table("orders");
        assert_eq!(bare.label, "orders");
        assert!(bare.dataset_id.is_empty());

        let view = AssetNode::table("p.d.v").with_type(AssetType::View);
        assert_eq!(view.asset_type, AssetType::View);
        assert_eq!(view.display_label(), "v");
    }

    #[test]
    fn asset_node_deserializes_catalog_shape() {
        let json = r#"{
            "id": "p.d.t",
            "label": "t",
            "type": "materialized_view",
            "projectId": "p",
            "datasetId": "d",
            "tableName": "t",
            "level": 1
        }"#;
        let node: AssetNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, AssetId::new("p.d.t"));
        assert_eq!(node.dataset_id, "d");
        assert_eq!(node.asset_type, AssetType::MaterializedView);
    }

    #[test]
    fn unknown_edge_kind_is_carried_as_other() {
        let edge: DependencyEdge =
            serde_json::from_str(r#"{"source": "a", "target": "b", "type": "lineage-magic"}"#)
                .unwrap();
        assert_eq!(edge.kind, EdgeKind::Other);

        let edge: DependencyEdge =
            serde_json::from_str(r#"{"source": "a", "target": "b"}"#).unwrap();
        assert_eq!(edge.kind, EdgeKind::Dependency);
        assert!(!edge.is_self_loop());
        assert!(DependencyEdge::new("a", "a").is_self_loop());
    }
}
