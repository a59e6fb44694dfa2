//! Downstream impact analysis.
//!
//! Answers "what breaks if this asset changes?" by walking outgoing edges
//! from the root. Assets one hop away are direct dependents; anything further
//! is an indirect dependent. Each asset is classified by its shortest path.
//!
//! The risk score is a saturating linear heuristic:
//!
//! ```text
//! risk_score = min(100, total_affected * 10 + longest_chain * 5)
//! ```
//!
//! Breadth of impact weighs twice as much as depth. Neither weight is
//! calibrated against incident data; they are kept as named constants so they
//! can be re-tuned.

use crate::domain::{AssetId, AssetNode, RiskLevel};
use crate::graph::LineageGraph;
use crate::graph::traversal::bfs_from_root;
use petgraph::Direction;
use serde::Serialize;

/// Points added per affected asset.
pub const AFFECTED_WEIGHT: usize = 10;

/// Points added per level of the longest dependency chain.
pub const CHAIN_WEIGHT: usize = 5;

/// Upper bound of the risk score.
pub const MAX_RISK_SCORE: u8 = 100;

/// An asset affected by a change to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedAsset {
    /// The affected asset
    pub node: AssetNode,
    /// Shortest number of hops from the root
    pub depth: usize,
}

/// Result of a downstream impact analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Asset the analysis started from
    pub root: AssetId,
    /// Assets one hop downstream, in traversal order
    pub direct_downstream: Vec<AffectedAsset>,
    /// Assets two or more hops downstream, in traversal order
    pub indirect_downstream: Vec<AffectedAsset>,
    /// `direct_downstream.len() + indirect_downstream.len()`
    pub total_affected: usize,
    /// Deepest hop count reached (0 when nothing is downstream)
    pub longest_chain: usize,
    /// Saturating risk score in `0..=100`
    pub risk_score: u8,
    /// Tier derived from `risk_score`
    pub risk_level: RiskLevel,
}

impl ImpactResult {
    /// Static recommended actions for this result's risk level.
    #[must_use]
    pub fn recommended_actions(&self) -> &'static [&'static str] {
        self.risk_level.recommended_actions()
    }

    /// All affected assets, direct ones first.
    pub fn affected(&self) -> impl Iterator<Item = &AffectedAsset> {
        self.direct_downstream
            .iter()
            .chain(self.indirect_downstream.iter())
    }
}

/// Compute the risk score for an impact of the given breadth and depth.
#[must_use]
pub fn risk_score(total_affected: usize, longest_chain: usize) -> u8 {
    let raw = total_affected
        .saturating_mul(AFFECTED_WEIGHT)
        .saturating_add(longest_chain.saturating_mul(CHAIN_WEIGHT));
    u8::try_from(raw.min(usize::from(MAX_RISK_SCORE))).unwrap_or(MAX_RISK_SCORE)
}

/// Analyze the downstream impact of changing the graph's root.
///
/// A root without outgoing edges yields an empty result with risk level
/// [`RiskLevel::Low`].
#[must_use]
pub fn analyze_impact(graph: &LineageGraph) -> ImpactResult {
    let mut direct_downstream = Vec::new();
    let mut indirect_downstream = Vec::new();
    let mut longest_chain = 0;

    for visit in bfs_from_root(graph, Direction::Outgoing, None) {
        longest_chain = longest_chain.max(visit.depth);
        let affected = AffectedAsset {
            node: graph.node_at(visit.index).clone(),
            depth: visit.depth,
        };
        if visit.depth == 1 {
            direct_downstream.push(affected);
        } else {
            indirect_downstream.push(affected);
        }
    }

    let total_affected = direct_downstream.len() + indirect_downstream.len();
    let risk_score = risk_score(total_affected, longest_chain);
    let risk_level = RiskLevel::from_score(risk_score);

    tracing::debug!(
        root = %graph.root_id(),
        direct = direct_downstream.len(),
        indirect = indirect_downstream.len(),
        longest_chain,
        risk_score,
        "Analyzed downstream impact"
    );

    ImpactResult {
        root: graph.root_id().clone(),
        direct_downstream,
        indirect_downstream,
        total_affected,
        longest_chain,
        risk_score,
        risk_level,
    }
}
