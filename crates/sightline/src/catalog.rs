//! Lineage documents supplied by the catalog service.
//!
//! The catalog answers a lineage request with a JSON document:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "id": "proj.sales.orders", "label": "orders", "type": "table",
//!       "projectId": "proj", "datasetId": "sales", "tableName": "orders", "level": 0 }
//!   ],
//!   "edges": [
//!     { "source": "proj.raw.orders", "target": "proj.sales.orders", "type": "dependency" }
//!   ],
//!   "rootNode": "proj.sales.orders"
//! }
//! ```
//!
//! Keys the engine does not use (`projectId`, `tableName`, `level`) are
//! accepted and ignored.

use crate::domain::{AssetId, AssetNode, DependencyEdge};
use crate::error::{Error, Result};
use crate::graph::LineageGraph;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A lineage payload as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageDocument {
    /// Assets in the lineage neighborhood
    #[serde(default)]
    pub nodes: Vec<AssetNode>,

    /// Dependencies between them
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,

    /// Asset the lineage was requested for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_node: Option<AssetId>,
}

impl LineageDocument {
    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Document` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Document`
    /// if it is not valid JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let document = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Loaded lineage document"
        );
        Ok(document)
    }

    /// Build a graph from this document.
    ///
    /// `root` overrides the document's `rootNode`.
    ///
    /// # Errors
    ///
    /// - `Error::MissingRoot` if neither `root` nor `rootNode` is set
    /// - any error from [`LineageGraph::build`]
    pub fn into_graph(self, root: Option<AssetId>) -> Result<LineageGraph> {
        let root = root.or(self.root_node).ok_or(Error::MissingRoot)?;
        LineageGraph::build(self.nodes, self.edges, &root)
    }
}
