//! Configuration for sightline.
//!
//! Settings are read from a YAML file. Every section and key is optional:
//!
//! ```yaml
//! root-cause:
//!   max-depth: 5
//!   include-root: false
//!   concurrency: 4
//!   lookup-timeout-ms: 10000
//! layout:
//!   column-spacing: 300.0
//!   row-spacing: 100.0
//! health:
//!   recent-hours: 24
//!   stale-hours: 72
//!   failure-window-hours: 24
//! ```

use crate::error::{Error, Result};
use crate::health::{HealthThresholds, MAX_THRESHOLD_HOURS};
use crate::layout::LayoutSpacing;
use crate::root_cause::{
    DEFAULT_CONCURRENCY, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MAX_DEPTH, RootCauseOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE_NAME: &str = "sightline.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SightlineConfig {
    /// Root-cause traversal settings
    pub root_cause: RootCauseConfig,
    /// Layout spacing
    pub layout: LayoutSpacing,
    /// Metadata health thresholds
    pub health: HealthThresholds,
}

/// The `root-cause` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RootCauseConfig {
    /// Maximum upstream hops
    pub max_depth: usize,
    /// Check the root asset too
    pub include_root: bool,
    /// Health lookups in flight at once
    pub concurrency: usize,
    /// Per-lookup timeout in milliseconds; 0 disables the timeout
    pub lookup_timeout_ms: u64,
}

impl Default for RootCauseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_root: false,
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout_ms: u64::try_from(DEFAULT_LOOKUP_TIMEOUT.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

impl RootCauseConfig {
    /// Convert to engine options.
    #[must_use]
    pub fn to_options(&self) -> RootCauseOptions {
        RootCauseOptions {
            max_depth: self.max_depth,
            include_root: self.include_root,
            concurrency: self.concurrency,
            lookup_timeout: (self.lookup_timeout_ms > 0)
                .then(|| Duration::from_millis(self.lookup_timeout_ms)),
        }
    }
}

impl SightlineConfig {
    /// Parse configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the YAML is malformed or has unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// its contents are invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    /// Load from `path` if given, else from `./sightline.yaml` if present,
    /// else use defaults.
    ///
    /// # Errors
    ///
    /// Same as [`SightlineConfig::load`]. An explicit path that does not
    /// exist is an error; a missing default file is not.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path).await;
        }

        let default_path = PathBuf::from(CONFIG_FILE_NAME);
        if tokio::fs::try_exists(&default_path).await? {
            tracing::debug!(path = %default_path.display(), "Using config file");
            Self::load(&default_path).await
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let spacing = &self.layout;
        if !(spacing.column_spacing.is_finite() && spacing.row_spacing.is_finite()) {
            return Err(Error::Config("layout spacing must be finite".to_string()));
        }
        if self.health.recent_hours < 0 || self.health.stale_hours < self.health.recent_hours {
            return Err(Error::Config(
                "health thresholds must satisfy 0 <= recent-hours <= stale-hours".to_string(),
            ));
        }
        if self.health.failure_window_hours < 0 {
            return Err(Error::Config(
                "failure-window-hours must not be negative".to_string(),
            ));
        }
        let health = &self.health;
        if [health.recent_hours, health.stale_hours, health.failure_window_hours]
            .iter()
            .any(|&hours| hours > MAX_THRESHOLD_HOURS)
        {
            return Err(Error::Config(format!(
                "health thresholds must not exceed {MAX_THRESHOLD_HOURS} hours"
            )));
        }
        Ok(())
    }
}
