//! Tiered layout of a lineage graph.
//!
//! Every node reachable from the root (following edges in either direction)
//! gets a signed tier: the root is tier 0, upstream producers get negative
//! tiers and downstream consumers positive ones. Tiers are assigned by a
//! single breadth-first walk, so the first tier a node is reached at is final.
//!
//! [`assign_positions`] turns tiers into 2-D coordinates for a renderer:
//! one column per tier, nodes centered vertically within their column in
//! first-visit order.

use crate::domain::AssetId;
use crate::graph::LineageGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Horizontal distance between tiers, in renderer units.
pub const DEFAULT_COLUMN_SPACING: f64 = 300.0;

/// Vertical distance between nodes of the same tier, in renderer units.
pub const DEFAULT_ROW_SPACING: f64 = 100.0;

/// A node and the tier it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierEntry {
    /// Asset ID
    pub id: AssetId,
    /// Signed distance from the root (negative is upstream)
    pub tier: i32,
}

/// Tier assignment for every node reachable from the root.
///
/// Entries are kept in first-visit order, which is also the stable
/// within-tier order used for layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tiers {
    entries: Vec<TierEntry>,
    index: HashMap<AssetId, usize>,
}

impl Tiers {
    fn push(&mut self, id: AssetId, tier: i32) {
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(TierEntry { id, tier });
    }

    /// Tier of an asset, or `None` if it was not reached from the root.
    #[must_use]
    pub fn get(&self, id: &AssetId) -> Option<i32> {
        self.index.get(id).map(|&i| self.entries[i].tier)
    }

    /// Number of tiered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no node was tiered (never true for a built graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-visit order.
    #[must_use]
    pub fn entries(&self) -> &[TierEntry] {
        &self.entries
    }

    /// Node IDs grouped by tier, lowest tier first, each group in visit order.
    #[must_use]
    pub fn by_tier(&self) -> BTreeMap<i32, Vec<&AssetId>> {
        let mut groups: BTreeMap<i32, Vec<&AssetId>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.tier).or_default().push(&entry.id);
        }
        groups
    }

    /// Plain `id -> tier` mapping.
    #[must_use]
    pub fn to_map(&self) -> HashMap<AssetId, i32> {
        self.entries
            .iter()
            .map(|entry| (entry.id.clone(), entry.tier))
            .collect()
    }
}

/// Assign a tier to every node reachable from the graph's root.
///
/// From a node at tier `t`, unvisited predecessors get `t - 1` and then
/// unvisited successors get `t + 1`, each in edge input order. Nodes not
/// connected to the root are omitted.
#[must_use]
pub fn compute_tiers(graph: &LineageGraph) -> Tiers {
    let root = graph.root_index();

    let mut tiers = Tiers::default();
    tiers.push(graph.root_id().clone(), 0);

    let mut visited = HashSet::from([root]);
    let mut queue: VecDeque<(NodeIndex, i32)> = VecDeque::from([(root, 0)]);

    while let Some((current, tier)) = queue.pop_front() {
        for (direction, next_tier) in [
            (Direction::Incoming, tier - 1),
            (Direction::Outgoing, tier + 1),
        ] {
            for neighbor in graph.ordered_neighbors(current, direction) {
                if visited.insert(neighbor) {
                    tiers.push(graph.node_at(neighbor).id.clone(), next_tier);
                    queue.push_back((neighbor, next_tier));
                }
            }
        }
    }

    tracing::debug!(
        root = %graph.root_id(),
        tiered = tiers.len(),
        total = graph.node_count(),
        "Computed layout tiers"
    );

    tiers
}

/// Spacing used to turn tiers into coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LayoutSpacing {
    /// Horizontal distance between adjacent tiers
    pub column_spacing: f64,
    /// Vertical distance between nodes in one tier
    pub row_spacing: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            column_spacing: DEFAULT_COLUMN_SPACING,
            row_spacing: DEFAULT_ROW_SPACING,
        }
    }
}

/// Renderer coordinates for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    /// Asset ID
    pub id: AssetId,
    /// Tier the node was assigned
    pub tier: i32,
    /// Index within its tier, in visit order
    pub row: usize,
    /// Horizontal coordinate (`tier * column_spacing`)
    pub x: f64,
    /// Vertical coordinate, centered on 0 within the tier
    pub y: f64,
}

/// Convert tiers into deterministic coordinates.
///
/// Positions are returned in the same order as [`Tiers::entries`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn assign_positions(tiers: &Tiers, spacing: LayoutSpacing) -> Vec<NodePosition> {
    let mut tier_sizes: HashMap<i32, usize> = HashMap::new();
    for entry in tiers.entries() {
        *tier_sizes.entry(entry.tier).or_default() += 1;
    }

    let mut next_row: HashMap<i32, usize> = HashMap::new();
    tiers
        .entries()
        .iter()
        .map(|entry| {
            let row = next_row.entry(entry.tier).or_default();
            let current = *row;
            *row += 1;

            let size = tier_sizes[&entry.tier];
            let offset = current as f64 - (size - 1) as f64 / 2.0;

            NodePosition {
                id: entry.id.clone(),
                tier: entry.tier,
                row: current,
                x: f64::from(entry.tier) * spacing.column_spacing,
                y: offset * spacing.row_spacing,
            }
        })
        .collect()
}
