//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use sightline::domain::{AssetId, AssetNode, DependencyEdge};
use sightline::graph::LineageGraph;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the sightline binary built by cargo for integration tests
pub fn sightline_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sightline"))
}

/// Run the sightline binary in the specified directory with colors disabled
pub fn run_sightline_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(sightline_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute sightline binary")
}

/// Build a graph of plain table nodes from string IDs
pub fn graph(nodes: &[&str], edges: &[(&str, &str)], root: &str) -> LineageGraph {
    LineageGraph::build(
        nodes.iter().map(|id| AssetNode::table(*id)),
        edges
            .iter()
            .map(|(source, target)| DependencyEdge::new(*source, *target)),
        &AssetId::new(root),
    )
    .expect("graph should build")
}

/// IDs of a slice of nodes, in order
pub fn ids<'a>(nodes: impl IntoIterator<Item = &'a AssetNode>) -> Vec<&'a str> {
    nodes.into_iter().map(|node| node.id.as_str()).collect()
}

/// A small warehouse lineage used by the CLI tests:
///
/// ```text
/// p.raw.orders ──► p.stg.orders ──► p.mart.revenue ──► p.rep.daily
/// p.raw.fx     ──► p.stg.fx     ──┘
/// ```
pub const WAREHOUSE_LINEAGE: &str = r#"{
  "nodes": [
    {"id": "p.raw.orders", "label": "orders", "datasetId": "raw", "type": "external"},
    {"id": "p.raw.fx", "label": "fx", "datasetId": "raw", "type": "external"},
    {"id": "p.stg.orders", "label": "orders", "datasetId": "stg", "type": "view"},
    {"id": "p.stg.fx", "label": "fx", "datasetId": "stg", "type": "view"},
    {"id": "p.mart.revenue", "label": "revenue", "datasetId": "mart", "type": "table"},
    {"id": "p.rep.daily", "label": "daily", "datasetId": "rep", "type": "table"}
  ],
  "edges": [
    {"source": "p.raw.orders", "target": "p.stg.orders", "type": "dependency"},
    {"source": "p.raw.fx", "target": "p.stg.fx", "type": "dependency"},
    {"source": "p.stg.orders", "target": "p.mart.revenue", "type": "dependency"},
    {"source": "p.stg.fx", "target": "p.mart.revenue", "type": "dependency"},
    {"source": "p.mart.revenue", "target": "p.rep.daily", "type": "dependency"}
  ],
  "rootNode": "p.mart.revenue"
}"#;

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture file");
    path
}
