//! Metadata-driven health checks.
//!
//! [`MetadataHealthProvider`] turns raw warehouse metadata into findings.
//! Checks run in this order:
//!
//! 1. **Freshness**: every asset with metadata gets one finding for its
//!    freshness bucket. Stale assets are critical and recent ones a warning.
//!    Fresh assets were modified inside the recent window, which may be a
//!    breaking change, so they are critical as well.
//! 2. **Empty table**: zero rows is critical.
//! 3. **Job failures**: any failed job inside the failure window is critical.
//!
//! Assets the source has no metadata for, and assets whose ID is not a
//! `project.dataset.table` reference, produce no findings.

use crate::domain::{AssetId, AssetNode, AssetType, Freshness, Severity};
use crate::error::{HealthError, Result};
use crate::root_cause::{HealthProvider, HealthReport, JobFailure, ObservedMetrics};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Largest accepted value for any of the [`HealthThresholds`] windows.
pub const MAX_THRESHOLD_HOURS: i64 = 24 * 365 * 100;

/// Most recent job failures attached to a report.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// Time windows used by the metadata checks, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HealthThresholds {
    /// Modified within this many hours counts as fresh
    pub recent_hours: i64,
    /// Not modified within this many hours counts as stale
    pub stale_hours: i64,
    /// How far back job failures are considered
    pub failure_window_hours: i64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            recent_hours: 24,
            stale_hours: 72,
            failure_window_hours: 24,
        }
    }
}

/// Warehouse metadata for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Current row count
    pub num_rows: u64,
    /// Storage size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_bytes: Option<u64>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Kind of warehouse object, if known
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
}

/// Async source of table metadata and job history.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Metadata for a table, or `None` if the source does not know it.
    ///
    /// # Errors
    ///
    /// Returns a `HealthError` if the source cannot be queried.
    async fn table_metadata(
        &self,
        id: &AssetId,
    ) -> std::result::Result<Option<TableMetadata>, HealthError>;

    /// Failed jobs touching a table created at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns a `HealthError` if the source cannot be queried.
    async fn recent_job_failures(
        &self,
        id: &AssetId,
        since: DateTime<Utc>,
    ) -> std::result::Result<Vec<JobFailure>, HealthError>;
}

/// Classify how fresh an asset is from the time since its last change.
#[must_use]
pub fn classify_freshness(age: TimeDelta, thresholds: &HealthThresholds) -> Freshness {
    if age < saturating_hours(thresholds.recent_hours) {
        Freshness::Fresh
    } else if age < saturating_hours(thresholds.stale_hours) {
        Freshness::Recent
    } else {
        Freshness::Stale
    }
}

fn saturating_hours(hours: i64) -> TimeDelta {
    TimeDelta::try_hours(hours).unwrap_or(if hours < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

/// Apply the metadata checks to one table.
///
/// `failures` should already be limited to the failure window.
#[must_use]
pub fn evaluate_metadata(
    metadata: &TableMetadata,
    failures: Vec<JobFailure>,
    now: DateTime<Utc>,
    thresholds: &HealthThresholds,
) -> HealthReport {
    let age = now - metadata.modified_at;
    let freshness = classify_freshness(age, thresholds);

    // Every freshness bucket yields exactly one finding.
    let (first_issue, mut severity) = match freshness {
        Freshness::Stale => (
            format!(
                "Data is stale (not updated in >{} hours)",
                thresholds.stale_hours
            ),
            Severity::Critical,
        ),
        Freshness::Recent => (
            format!(
                "Data may be outdated (>{} hours old)",
                thresholds.recent_hours
            ),
            Severity::Warning,
        ),
        Freshness::Fresh => (
            format!(
                "Modified {} hours ago (potential breaking change)",
                age.num_hours().max(0)
            ),
            Severity::Critical,
        ),
    };
    let mut issues = vec![first_issue];

    if metadata.num_rows == 0 {
        issues.push("Table is empty (0 rows)".to_string());
        severity = Severity::Critical;
    }

    if !failures.is_empty() {
        issues.push(format!(
            "{} job failure(s) in last {} hours",
            failures.len(),
            thresholds.failure_window_hours
        ));
        severity = Severity::Critical;
    }

    HealthReport {
        issues,
        severity: Some(severity),
        metrics: Some(ObservedMetrics {
            last_modified: Some(metadata.modified_at),
            freshness: Some(freshness),
            num_rows: Some(metadata.num_rows),
            job_failures: failures,
        }),
    }
}

/// Health provider that derives findings from a [`MetadataSource`].
#[derive(Debug, Clone)]
pub struct MetadataHealthProvider<S> {
    source: S,
    thresholds: HealthThresholds,
    reference_time: Option<DateTime<Utc>>,
}

impl<S: MetadataSource> MetadataHealthProvider<S> {
    /// Create a provider with default thresholds that uses the current time.
    pub fn new(source: S) -> Self {
        Self {
            source,
            thresholds: HealthThresholds::default(),
            reference_time: None,
        }
    }

    /// Use custom thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Evaluate ages against a fixed point in time instead of the clock.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    /// The underlying metadata source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: MetadataSource> HealthProvider for MetadataHealthProvider<S> {
    async fn health(&self, node: &AssetNode) -> std::result::Result<HealthReport, HealthError> {
        let now = self.reference_time.unwrap_or_else(Utc::now);

        if node.id.table_ref().is_none() {
            tracing::debug!(asset = %node.id, "Not a project.dataset.table ID, skipping");
            return Ok(HealthReport::healthy());
        }

        let Some(metadata) = self.source.table_metadata(&node.id).await? else {
            tracing::debug!(asset = %node.id, "No metadata available");
            return Ok(HealthReport::healthy());
        };

        let since = now
            .checked_sub_signed(saturating_hours(self.thresholds.failure_window_hours))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut failures = match self.source.recent_job_failures(&node.id, since).await {
            Ok(failures) => failures,
            Err(error) => {
                tracing::warn!(
                    asset = %node.id,
                    error = %error,
                    "Could not fetch job failures"
                );
                Vec::new()
            }
        };
        failures.truncate(MAX_REPORTED_FAILURES);

        Ok(evaluate_metadata(&metadata, failures, now, &self.thresholds))
    }
}

/// Metadata and job history for one asset, as stored by [`StaticMetadataSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    /// Table metadata
    #[serde(flatten)]
    pub metadata: TableMetadata,
    /// All known failed jobs, in any order
    #[serde(default)]
    pub job_failures: Vec<JobFailure>,
}

/// In-memory [`MetadataSource`].
///
/// The JSON form (used by `sightline root-cause --metadata`) maps asset IDs to
/// records:
///
/// ```json
/// {
///   "proj.raw.events": {
///     "numRows": 0,
///     "modifiedAt": "2024-05-01T08:00:00Z",
///     "jobFailures": [
///       { "jobId": "job_1", "creationTime": "2024-05-01T07:00:00Z" }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    records: HashMap<AssetId, MetadataRecord>,
}

impl StaticMetadataSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the record for an asset.
    #[must_use]
    pub fn with_record(mut self, id: impl Into<AssetId>, record: MetadataRecord) -> Self {
        self.records.insert(id.into(), record);
        self
    }

    /// Parse records from a JSON object keyed by asset ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::Document` if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: HashMap<AssetId, MetadataRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// Load records from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Document`
    /// if it is not valid JSON.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn table_metadata(
        &self,
        id: &AssetId,
    ) -> std::result::Result<Option<TableMetadata>, HealthError> {
        Ok(self.records.get(id).map(|record| record.metadata.clone()))
    }

    async fn recent_job_failures(
        &self,
        id: &AssetId,
        since: DateTime<Utc>,
    ) -> std::result::Result<Vec<JobFailure>, HealthError> {
        let mut failures: Vec<JobFailure> = self
            .records
            .get(id)
            .map(|record| {
                record
                    .job_failures
                    .iter()
                    .filter(|failure| failure.creation_time >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        failures.sort_by(|a, b| b.creation_time.cmp(&a.creation_time));
        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn metadata(hours_old: i64, num_rows: u64) -> TableMetadata {
        TableMetadata {
            num_rows,
            num_bytes: None,
            modified_at: now() - TimeDelta::hours(hours_old),
            created_at: None,
            asset_type: None,
        }
    }

    fn failure(job_id: &str, hours_ago: i64) -> JobFailure {
        JobFailure {
            job_id: job_id.to_string(),
            creation_time: now() - TimeDelta::hours(hours_ago),
            error_reason: Some("invalidQuery".to_string()),
            error_message: None,
        }
    }

    #[rstest]
    #[case::just_modified(0, Freshness::Fresh)]
    #[case::under_a_day(23, Freshness::Fresh)]
    #[case::one_day(24, Freshness::Recent)]
    #[case::under_three_days(71, Freshness::Recent)]
    #[case::three_days(72, Freshness::Stale)]
    #[case::a_month(720, Freshness::Stale)]
    fn test_freshness_buckets(#[case] hours: i64, #[case] expected: Freshness) {
        let got = classify_freshness(TimeDelta::hours(hours), &HealthThresholds::default());
        assert_eq!(got, expected);
    }

    #[test]
    fn test_stale_table_is_critical() {
        let report =
            evaluate_metadata(&metadata(100, 10), vec![], now(), &HealthThresholds::default());
        assert_eq!(report.issues, vec!["Data is stale (not updated in >72 hours)"]);
        assert_eq!(report.severity, Some(Severity::Critical));
        let metrics = report.metrics.unwrap();
        assert_eq!(metrics.freshness, Some(Freshness::Stale));
        assert_eq!(metrics.num_rows, Some(10));
    }

    #[test]
    fn test_recent_table_is_warning() {
        let report =
            evaluate_metadata(&metadata(30, 10), vec![], now(), &HealthThresholds::default());
        assert_eq!(report.issues, vec!["Data may be outdated (>24 hours old)"]);
        assert_eq!(report.severity, Some(Severity::Warning));
    }

    #[test]
    fn test_fresh_change_flags_possible_breaking_change() {
        let report =
            evaluate_metadata(&metadata(5, 10), vec![], now(), &HealthThresholds::default());
        assert_eq!(
            report.issues,
            vec!["Modified 5 hours ago (potential breaking change)"]
        );
        assert_eq!(report.severity, Some(Severity::Critical));
    }

    #[test]
    fn test_empty_table_and_failures_accumulate() {
        let report = evaluate_metadata(
            &metadata(30, 0),
            vec![failure("j1", 2), failure("j2", 3)],
            now(),
            &HealthThresholds::default(),
        );
        assert_eq!(
            report.issues,
            vec![
                "Data may be outdated (>24 hours old)",
                "Table is empty (0 rows)",
                "2 job failure(s) in last 24 hours",
            ]
        );
        assert_eq!(report.severity, Some(Severity::Critical));
        assert_eq!(report.metrics.unwrap().job_failures.len(), 2);
    }

    #[test]
    fn test_future_timestamp_reports_zero_hours() {
        let mut future = metadata(0, 10);
        future.modified_at = now() + TimeDelta::minutes(30);
        let report = evaluate_metadata(&future, vec![], now(), &HealthThresholds::default());
        assert_eq!(
            report.issues,
            vec!["Modified 0 hours ago (potential breaking change)"]
        );
    }

    #[tokio::test]
    async fn test_provider_without_metadata_is_healthy() {
        let provider = MetadataHealthProvider::new(StaticMetadataSource::new()).at(now());
        let report = provider.health(&AssetNode::table("p.d.t")).await.unwrap();
        assert!(report.issues.is_empty());
        assert!(report.metrics.is_none());
    }

    #[tokio::test]
    async fn test_provider_filters_failures_to_window() {
        let source = StaticMetadataSource::new().with_record(
            "p.d.t",
            MetadataRecord {
                metadata: metadata(30, 10),
                job_failures: vec![failure("old", 48), failure("new", 1)],
            },
        );
        let provider = MetadataHealthProvider::new(source).at(now());

        let report = provider.health(&AssetNode::table("p.d.t")).await.unwrap();
        let failures = report.metrics.unwrap().job_failures;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].job_id, "new");
    }

    #[tokio::test]
    async fn test_provider_caps_reported_failures() {
        let failures = (0..8).map(|i| failure(&format!("j{i}"), i)).collect();
        let source = StaticMetadataSource::new().with_record(
            "p.d.t",
            MetadataRecord {
                metadata: metadata(30, 10),
                job_failures: failures,
            },
        );
        let provider = MetadataHealthProvider::new(source).at(now());

        let report = provider.health(&AssetNode::table("p.d.t")).await.unwrap();
        let failures = report.metrics.unwrap().job_failures;
        assert_eq!(failures.len(), MAX_REPORTED_FAILURES);
        assert_eq!(failures[0].job_id, "j0");
    }

    #[tokio::test]
    async fn test_huge_windows_saturate_instead_of_overflowing() {
        let source = StaticMetadataSource::new().with_record(
            "p.d.t",
            MetadataRecord {
                metadata: metadata(30, 10),
                job_failures: vec![failure("ancient", 24 * 365 * 50)],
            },
        );
        let thresholds = HealthThresholds {
            recent_hours: 3_000_000_000,
            stale_hours: 10_000_000_000_000,
            failure_window_hours: 3_000_000_000,
        };
        let provider = MetadataHealthProvider::new(source)
            .with_thresholds(thresholds)
            .at(now());

        let report = provider.health(&AssetNode::table("p.d.t")).await.unwrap();
        let metrics = report.metrics.unwrap();
        assert_eq!(metrics.freshness, Some(Freshness::Fresh));
        assert_eq!(metrics.job_failures.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_skips_ids_that_are_not_table_refs() {
        let source = StaticMetadataSource::new().with_record(
            "orders",
            MetadataRecord {
                metadata: metadata(100, 0),
                job_failures: vec![],
            },
        );
        let provider = MetadataHealthProvider::new(source).at(now());

        let report = provider.health(&AssetNode::table("orders")).await.unwrap();
        assert!(report.issues.is_empty());
        assert!(report.metrics.is_none());
    }

    #[test]
    fn test_static_source_from_json() {
        let source = StaticMetadataSource::from_json_str(
            r#"{
                "p.d.t": {
                    "numRows": 0,
                    "modifiedAt": "2024-05-01T08:00:00Z",
                    "type": "view",
                    "jobFailures": [
                        {"jobId": "job_1", "creationTime": "2024-05-01T07:00:00Z"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let record = &source.records[&AssetId::new("p.d.t")];
        assert_eq!(record.metadata.num_rows, 0);
        assert_eq!(record.metadata.asset_type, Some(AssetType::View));
        assert_eq!(record.job_failures.len(), 1);
    }
}
