//! Command execution logic.

use anyhow::{Context, Result};

use super::args::{ImpactArgs, LineageArgs, RootCauseArgs, TiersArgs};
use crate::catalog::LineageDocument;
use crate::config::SightlineConfig;
use crate::domain::AssetId;
use crate::graph::LineageGraph;
use crate::health::{MetadataHealthProvider, StaticHealthProvider, StaticMetadataSource};
use crate::impact::analyze_impact;
use crate::layout::{assign_positions, compute_tiers};
use crate::output::{self, OutputMode};
use crate::root_cause::{RootCauseOptions, find_suspicious_upstream};

/// Load the lineage document and build its graph.
///
/// Construction warnings are logged, not fatal.
async fn load_graph(args: &LineageArgs) -> Result<LineageGraph> {
    let document = LineageDocument::load(&args.lineage)
        .await
        .with_context(|| format!("Failed to load lineage from {}", args.lineage.display()))?;

    let graph = document.into_graph(args.root.as_deref().map(AssetId::new))?;
    for warning in graph.warnings() {
        tracing::warn!(%warning, "Lineage document inconsistency");
    }

    tracing::debug!(
        root = %graph.root_id(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built lineage graph"
    );
    Ok(graph)
}

/// Execute the tiers command
pub async fn execute_tiers(
    args: &TiersArgs,
    config: &SightlineConfig,
    output_mode: OutputMode,
) -> Result<()> {
    let graph = load_graph(&args.lineage).await?;
    let tiers = compute_tiers(&graph);
    let positions = args
        .positions
        .then(|| assign_positions(&tiers, config.layout));

    output::print_tiers(&graph, &tiers, positions.as_deref(), output_mode)?;
    Ok(())
}

/// Execute the impact command
pub async fn execute_impact(args: &ImpactArgs, output_mode: OutputMode) -> Result<()> {
    let graph = load_graph(&args.lineage).await?;
    let result = analyze_impact(&graph);

    output::print_impact(&result, output_mode)?;
    Ok(())
}

/// Resolve root-cause options: config file first, then command-line overrides.
fn root_cause_options(args: &RootCauseArgs, config: &SightlineConfig) -> RootCauseOptions {
    let mut options = config.root_cause.to_options();
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if args.include_root {
        options.include_root = true;
    }
    if let Some(concurrency) = args.concurrency {
        options.concurrency = usize::from(concurrency);
    }
    options
}

/// Execute the root-cause command
pub async fn execute_root_cause(
    args: &RootCauseArgs,
    config: &SightlineConfig,
    output_mode: OutputMode,
) -> Result<()> {
    let graph = load_graph(&args.lineage).await?;
    let options = root_cause_options(args, config);

    let result = match (&args.metadata, &args.health) {
        (Some(path), _) => {
            let source = StaticMetadataSource::load(path)
                .await
                .with_context(|| format!("Failed to load metadata from {}", path.display()))?;
            let mut provider = MetadataHealthProvider::new(source).with_thresholds(config.health);
            if let Some(as_of) = args.as_of {
                provider = provider.at(as_of);
            }
            find_suspicious_upstream(&graph, &options, &provider).await
        }
        (None, Some(path)) => {
            let provider = StaticHealthProvider::load(path)
                .await
                .with_context(|| format!("Failed to load health reports from {}", path.display()))?;
            find_suspicious_upstream(&graph, &options, &provider).await
        }
        (None, None) => anyhow::bail!("One of --metadata or --health is required"),
    };

    output::print_root_cause(&result, output_mode)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use std::time::Duration;

    fn root_cause_args(argv: &[&str]) -> RootCauseArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::RootCause(args)) => args,
            other => panic!("Expected RootCause command, got {other:?}"),
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = SightlineConfig::from_yaml_str(
            "root-cause:\n  max-depth: 3\n  concurrency: 8\n  lookup-timeout-ms: 250\n",
        )
        .unwrap();
        let args = root_cause_args(&["sightline", "root-cause", "l.json", "--health", "h.json"]);

        let options = root_cause_options(&args, &config);
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.concurrency, 8);
        assert!(!options.include_root);
        assert_eq!(options.lookup_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = SightlineConfig::from_yaml_str("root-cause:\n  max-depth: 3\n").unwrap();
        let args = root_cause_args(&[
            "sightline",
            "root-cause",
            "l.json",
            "--health",
            "h.json",
            "--max-depth",
            "1",
            "--include-root",
            "--concurrency",
            "2",
        ]);

        let options = root_cause_options(&args, &config);
        assert_eq!(options.max_depth, 1);
        assert!(options.include_root);
        assert_eq!(options.concurrency, 2);
    }

    #[tokio::test]
    async fn test_load_graph_reports_missing_file() {
        let args = LineageArgs {
            lineage: "/nonexistent/lineage.json".into(),
            root: None,
        };
        let err = load_graph(&args).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load lineage"));
    }

    #[tokio::test]
    async fn test_load_graph_with_root_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");
        std::fs::write(
            &path,
            r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#,
        )
        .unwrap();

        let args = LineageArgs {
            lineage: path.clone(),
            root: Some("b".to_string()),
        };
        let graph = load_graph(&args).await.unwrap();
        assert_eq!(graph.root_id().as_str(), "b");

        let args = LineageArgs {
            lineage: path,
            root: None,
        };
        assert!(load_graph(&args).await.is_err());
    }
}
