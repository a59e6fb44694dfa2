//! Sightline - lineage analysis for warehouse tables.
//!
//! Given a lineage graph of data assets (tables, views, external sources)
//! and the dependencies between them, sightline answers three questions
//! about a selected root asset:
//!
//! - [`layout`]: where does every connected asset sit, in signed tiers
//!   relative to the root?
//! - [`impact`]: what breaks downstream if the root changes, and how risky
//!   is that?
//! - [`root_cause`]: which upstream asset is the likely culprit when the
//!   root's data looks wrong?
//!
//! Graphs are built once by [`graph::LineageGraph::build`] and never mutated,
//! so every analysis is a pure function of the graph (plus, for root-cause,
//! the answers of a [`root_cause::HealthProvider`]).
//!
//! # Example
//!
//! ```
//! use sightline::domain::{AssetId, AssetNode, DependencyEdge, RiskLevel};
//! use sightline::graph::LineageGraph;
//! use sightline::impact::analyze_impact;
//!
//! let graph = LineageGraph::build(
//!     ["p.raw.a", "p.mart.b", "p.rep.c"].map(AssetNode::table),
//!     [
//!         DependencyEdge::new("p.raw.a", "p.mart.b"),
//!         DependencyEdge::new("p.mart.b", "p.rep.c"),
//!     ],
//!     &AssetId::new("p.raw.a"),
//! )?;
//!
//! let impact = analyze_impact(&graph);
//! assert_eq!(impact.risk_score, 30);
//! assert_eq!(impact.risk_level, RiskLevel::Medium);
//! # Ok::<(), sightline::error::Error>(())
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod health;
pub mod impact;
pub mod layout;
pub mod root_cause;

// Public CLI module (needed by binary)
pub mod cli;

// Output formatting (used by the CLI)
pub mod output;
