//! JSON report shapes for `--json` output.

use crate::domain::AssetId;
use crate::graph::GraphWarning;
use crate::impact::ImpactResult;
use crate::layout::{NodePosition, Tiers};
use crate::root_cause::RootCauseResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TierGroup<'a> {
    pub tier: i32,
    pub nodes: Vec<&'a AssetId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TiersReport<'a> {
    pub root: &'a AssetId,
    pub tiers: Vec<TierGroup<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<&'a [NodePosition]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<'a> TiersReport<'a> {
    pub(crate) fn new(
        root: &'a AssetId,
        tiers: &'a Tiers,
        positions: Option<&'a [NodePosition]>,
        warnings: &[GraphWarning],
    ) -> Self {
        Self {
            root,
            tiers: tiers
                .by_tier()
                .into_iter()
                .map(|(tier, nodes)| TierGroup { tier, nodes })
                .collect(),
            positions,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImpactReport<'a> {
    #[serde(flatten)]
    pub result: &'a ImpactResult,
    pub recommended_actions: &'static [&'static str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RootCauseReport<'a> {
    #[serde(flatten)]
    pub result: &'a RootCauseResult,
    pub timestamp: DateTime<Utc>,
}
