//! Error types for sightline operations.
//!
//! Errors fall into two groups:
//!
//! - **`Error`**: failures surfaced to the caller. Graph construction is the
//!   only engine step that can fail; loading documents and configuration adds
//!   I/O and parse failures.
//! - **`HealthError`**: failures of a health-signal collaborator. These never
//!   escape root-cause analysis; the affected node degrades to "no issues".

use crate::domain::AssetId;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// The error type for sightline operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested root asset is not part of the supplied node set.
    #[error("Root asset not found: {0}")]
    RootNotFound(AssetId),

    /// No nodes were supplied at all.
    #[error("Lineage graph has no nodes")]
    EmptyGraph,

    /// A lineage document did not name a root and none was given.
    #[error("No root asset specified")]
    MissingRoot,

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A JSON document could not be parsed.
    #[error("Invalid document: {0}")]
    Document(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized Result type for sightline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by (or on behalf of) a health-signal collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HealthError {
    /// The collaborator could not be reached or refused the request.
    #[error("health source unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not finish within the configured timeout.
    #[error("health lookup timed out after {0:?}")]
    Timeout(Duration),
}
