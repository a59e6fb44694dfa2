//! Lineage graph model built on petgraph.
//!
//! A [`LineageGraph`] is constructed once per analysis request from a flat
//! node list, a flat edge list and a root asset ID, and is immutable
//! afterwards. The layout, impact and root-cause engines all read the same
//! graph independently.
//!
//! # Architecture
//!
//! - `petgraph::DiGraph<AssetNode, EdgeKind>` holds nodes and edges
//! - `HashMap<AssetId, NodeIndex>` maps asset IDs to graph nodes
//! - Forward adjacency is `Direction::Outgoing`, reverse adjacency is
//!   `Direction::Incoming`; both are derived from the same edge set
//!
//! ## Edge Direction Convention
//!
//! Edges point in the direction data flows: **producer -> consumer**.
//!
//! - **Edge source**: the upstream asset that is read from
//! - **Edge target**: the downstream asset that is built from it
//! - **Edge weight**: the [`EdgeKind`], carried but never interpreted
//!
//! Impact analysis follows outgoing edges, root-cause analysis follows
//! incoming edges, and the tiered layout follows both.
//!
//! ## Ordering
//!
//! Nodes keep their input order. Neighbors are always visited in the order
//! their edges were supplied, so identical input produces identical traversals.
//!
//! ## Inconsistent Input
//!
//! External catalogs are occasionally inconsistent. Construction never fails
//! because of bad edges; instead it records a [`GraphWarning`] and moves on.
//! Only a missing root (or an empty node set) is an error.

pub(crate) mod traversal;

use crate::domain::{AssetId, AssetNode, DependencyEdge, EdgeKind};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A non-fatal problem found while building a graph.
///
/// The engine does not log these itself; callers decide how to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    /// A node ID appeared more than once; the first occurrence was kept.
    DuplicateNode {
        /// The repeated ID.
        id: AssetId,
        /// Whether the ignored occurrence differed from the kept one.
        conflicting: bool,
    },

    /// An edge referenced a node that is not in the node set and was dropped.
    DanglingEdge {
        /// Source of the dropped edge.
        source: AssetId,
        /// Target of the dropped edge.
        target: AssetId,
        /// The endpoint that could not be resolved.
        missing: AssetId,
    },

    /// The same `source -> target` pair appeared again; the first was kept.
    DuplicateEdge {
        /// Source of the repeated edge.
        source: AssetId,
        /// Target of the repeated edge.
        target: AssetId,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::DuplicateNode { id, conflicting } => {
                if *conflicting {
                    write!(f, "duplicate node '{id}' with different content ignored")
                } else {
                    write!(f, "duplicate node '{id}' ignored")
                }
            }
            GraphWarning::DanglingEdge {
                source,
                target,
                missing,
            } => write!(
                f,
                "edge {source} -> {target} dropped: unknown node '{missing}'"
            ),
            GraphWarning::DuplicateEdge { source, target } => {
                write!(f, "duplicate edge {source} -> {target} ignored")
            }
        }
    }
}

/// Immutable lineage graph rooted at a selected asset.
#[derive(Debug, Clone)]
pub struct LineageGraph {
    /// Nodes hold the asset, edges hold the relationship kind.
    /// Edge direction: source (producer) -> target (consumer).
    graph: DiGraph<AssetNode, EdgeKind>,

    /// Every node in `graph` has exactly one entry here.
    node_map: HashMap<AssetId, NodeIndex>,

    /// Root of every traversal
    root: NodeIndex,

    /// Problems found while building
    warnings: Vec<GraphWarning>,
}

impl LineageGraph {
    /// Build a graph from flat node and edge lists.
    ///
    /// Nodes are deduplicated by ID keeping the first occurrence. Edges whose
    /// endpoints are not both present are dropped, as are repeated
    /// `source -> target` pairs. Self-loops are kept; traversals never revisit
    /// a node, so they are harmless.
    ///
    /// # Errors
    ///
    /// - `Error::EmptyGraph` if `nodes` is empty
    /// - `Error::RootNotFound` if `root_id` is not among the nodes
    pub fn build<N, E>(nodes: N, edges: E, root_id: &AssetId) -> Result<Self>
    where
        N: IntoIterator<Item = AssetNode>,
        E: IntoIterator<Item = DependencyEdge>,
    {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<AssetId, NodeIndex> = HashMap::new();
        let mut warnings = Vec::new();

        for node in nodes {
            if let Some(&existing) = node_map.get(&node.id) {
                warnings.push(GraphWarning::DuplicateNode {
                    conflicting: graph[existing] != node,
                    id: node.id,
                });
                continue;
            }
            let id = node.id.clone();
            let index = graph.add_node(node);
            node_map.insert(id, index);
        }

        if node_map.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let root = *node_map
            .get(root_id)
            .ok_or_else(|| Error::RootNotFound(root_id.clone()))?;

        let mut seen_pairs: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
        for edge in edges {
            let source = node_map.get(&edge.source).copied();
            let target = node_map.get(&edge.target).copied();
            let (Some(source), Some(target)) = (source, target) else {
                let missing = if source.is_none() {
                    edge.source.clone()
                } else {
                    edge.target.clone()
                };
                warnings.push(GraphWarning::DanglingEdge {
                    source: edge.source,
                    target: edge.target,
                    missing,
                });
                continue;
            };

            if !seen_pairs.insert((source, target)) {
                warnings.push(GraphWarning::DuplicateEdge {
                    source: edge.source,
                    target: edge.target,
                });
                continue;
            }

            graph.add_edge(source, target, edge.kind);
        }

        Ok(Self {
            graph,
            node_map,
            root,
            warnings,
        })
    }

    /// The root asset.
    #[must_use]
    pub fn root(&self) -> &AssetNode {
        &self.graph[self.root]
    }

    /// ID of the root asset.
    #[must_use]
    pub fn root_id(&self) -> &AssetId {
        &self.graph[self.root].id
    }

    /// Look up an asset by ID.
    #[must_use]
    pub fn node(&self, id: &AssetId) -> Option<&AssetNode> {
        self.node_map.get(id).map(|&index| &self.graph[index])
    }

    /// Whether an asset with this ID is in the graph.
    #[must_use]
    pub fn contains(&self, id: &AssetId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Number of (deduplicated) nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges kept after construction.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = &AssetNode> {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    /// All kept edges in input order.
    pub fn edges(&self) -> impl Iterator<Item = (&AssetId, &AssetId, EdgeKind)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()].id,
                &self.graph[edge.target()].id,
                *edge.weight(),
            )
        })
    }

    /// Direct consumers of an asset, in edge input order.
    ///
    /// Returns an empty list for unknown IDs.
    #[must_use]
    pub fn successors(&self, id: &AssetId) -> Vec<&AssetNode> {
        self.neighbors_of(id, Direction::Outgoing)
    }

    /// Direct producers of an asset, in edge input order.
    ///
    /// Returns an empty list for unknown IDs.
    #[must_use]
    pub fn predecessors(&self, id: &AssetId) -> Vec<&AssetNode> {
        self.neighbors_of(id, Direction::Incoming)
    }

    /// Problems found while building the graph.
    #[must_use]
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    fn neighbors_of(&self, id: &AssetId, direction: Direction) -> Vec<&AssetNode> {
        let Some(&index) = self.node_map.get(id) else {
            return Vec::new();
        };
        self.ordered_neighbors(index, direction)
            .into_iter()
            .map(|neighbor| &self.graph[neighbor])
            .collect()
    }

    pub(crate) fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> &AssetNode {
        &self.graph[index]
    }

    /// Neighbors of `index` in the given direction, in edge input order.
    ///
    /// petgraph walks a node's edge list newest-first. Edges are never removed,
    /// so edge indices are insertion order and sorting by them restores the
    /// order the edges were supplied in.
    pub(crate) fn ordered_neighbors(
        &self,
        index: NodeIndex,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge| {
                let neighbor = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), neighbor)
            })
            .collect();
        edges.sort_by_key(|(edge_id, _)| *edge_id);
        edges.into_iter().map(|(_, neighbor)| neighbor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nodes: &[&AssetNode]) -> Vec<String> {
        nodes.iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_build_simple_chain() {
        let graph = LineageGraph::build(
            vec![
                AssetNode::table("a"),
                AssetNode::table("b"),
                AssetNode::table("c"),
            ],
            vec![DependencyEdge::new("a", "b"), DependencyEdge::new("b", "c")],
            &AssetId::new("a"),
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.root_id(), &AssetId::new("a"));
        assert_eq!(ids(&graph.successors(&AssetId::new("a"))), vec!["b"]);
        assert_eq!(ids(&graph.predecessors(&AssetId::new("c"))), vec!["b"]);
        assert_eq!(ids(&graph.nodes().collect::<Vec<_>>()), vec!["a", "b", "c"]);
        assert!(graph.contains(&AssetId::new("c")));
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn test_root_not_found() {
        let result = LineageGraph::build(
            vec![AssetNode::table("a")],
            vec![],
            &AssetId::new("missing"),
        );
        assert!(matches!(result, Err(Error::RootNotFound(id)) if id.as_str() == "missing"));
    }

    #[test]
    fn test_empty_graph() {
        let result = LineageGraph::build(vec![], vec![], &AssetId::new("a"));
        assert!(matches!(result, Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_duplicate_nodes_keep_first() {
        let first = AssetNode::table("a");
        let mut second = AssetNode::table("a");
        second.label = "renamed".to_string();

        let graph = LineageGraph::build(
            vec![first.clone(), second, AssetNode::table("a")],
            vec![],
            &AssetId::new("a"),
        )
        .unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.root(), &first);
        assert_eq!(
            graph.warnings(),
            &[
                GraphWarning::DuplicateNode {
                    id: AssetId::new("a"),
                    conflicting: true,
                },
                GraphWarning::DuplicateNode {
                    id: AssetId::new("a"),
                    conflicting: false,
                },
            ]
        );
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let graph = LineageGraph::build(
            vec![AssetNode::table("a"), AssetNode::table("b")],
            vec![
                DependencyEdge::new("x", "a"),
                DependencyEdge::new("a", "b"),
                DependencyEdge::new("b", "y"),
            ],
            &AssetId::new("a"),
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.warnings(),
            &[
                GraphWarning::DanglingEdge {
                    source: AssetId::new("x"),
                    target: AssetId::new("a"),
                    missing: AssetId::new("x"),
                },
                GraphWarning::DanglingEdge {
                    source: AssetId::new("b"),
                    target: AssetId::new("y"),
                    missing: AssetId::new("y"),
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_edges_keep_first_kind() {
        let graph = LineageGraph::build(
            vec![AssetNode::table("a"), AssetNode::table("b")],
            vec![
                DependencyEdge::new("a", "b").with_kind(EdgeKind::Read),
                DependencyEdge::new("a", "b").with_kind(EdgeKind::Write),
            ],
            &AssetId::new("a"),
        )
        .unwrap();

        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].2, EdgeKind::Read);
        assert_eq!(graph.warnings().len(), 1);
    }

    #[test]
    fn test_neighbors_follow_input_order() {
        let graph = LineageGraph::build(
            vec![
                AssetNode::table("root"),
                AssetNode::table("c"),
                AssetNode::table("a"),
                AssetNode::table("b"),
            ],
            vec![
                DependencyEdge::new("root", "c"),
                DependencyEdge::new("root", "a"),
                DependencyEdge::new("root", "b"),
            ],
            &AssetId::new("root"),
        )
        .unwrap();

        assert_eq!(
            ids(&graph.successors(&AssetId::new("root"))),
            vec!["c", "a", "b"]
        );
    }

    #[test]
    fn test_self_loop_is_kept() {
        let graph = LineageGraph::build(
            vec![AssetNode::table("a")],
            vec![DependencyEdge::new("a", "a")],
            &AssetId::new("a"),
        )
        .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(ids(&graph.successors(&AssetId::new("a"))), vec!["a"]);
    }

    #[test]
    fn test_unknown_id_has_no_neighbors() {
        let graph =
            LineageGraph::build(vec![AssetNode::table("a")], vec![], &AssetId::new("a")).unwrap();
        assert!(graph.successors(&AssetId::new("zzz")).is_empty());
        assert!(graph.node(&AssetId::new("zzz")).is_none());
    }
}
