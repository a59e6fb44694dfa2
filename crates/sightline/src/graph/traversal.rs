//! Breadth-first traversal shared by the impact and root-cause engines.

use super::LineageGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// A node reached by [`bfs_from_root`] and the hop count it was first reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Visit {
    pub(crate) index: NodeIndex,
    pub(crate) depth: usize,
}

/// Walk the graph from its root along one edge direction.
///
/// Returns every node reached (the root excluded) in discovery order with the
/// depth at which it was first reached. A node is visited at most once, so the
/// recorded depth is its shortest distance from the root. Nodes are not
/// expanded past `max_depth` hops when a limit is given.
pub(crate) fn bfs_from_root(
    graph: &LineageGraph,
    direction: Direction,
    max_depth: Option<usize>,
) -> Vec<Visit> {
    let root = graph.root_index();

    let mut result = Vec::new();
    let mut visited = HashSet::from([root]);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::from([(root, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        for neighbor in graph.ordered_neighbors(current, direction) {
            if visited.insert(neighbor) {
                let next_depth = depth + 1;
                queue.push_back((neighbor, next_depth));
                result.push(Visit {
                    index: neighbor,
                    depth: next_depth,
                });
            }
        }
    }

    result
}
