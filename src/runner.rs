//! End-to-end scan run: probe, filter, write the report.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::adapters::{PlatformAdapter, ProbeResult, ProbeStatus};
use crate::config::ScanConfig;
use crate::discovery::Scanner;
use crate::filter::apply_filters;
use crate::output::write_report;

/// Scan with `adapter`, apply the configured filters and write the report.
///
/// Rows are sorted by model id so reports diff cleanly between runs.
/// Returns the rows that were written.
pub async fn run_scan(
    config: &ScanConfig,
    adapter: Arc<dyn PlatformAdapter>,
    cancel: &CancellationToken,
) -> Result<Vec<ProbeResult>> {
    let scanner = Scanner::new(adapter, config.workers);
    let results = scanner.scan(cancel, &config.excludes).await?;
    let scanned = results.len();

    let mut results = apply_filters(results, &config.filters);
    if config.only_ok {
        results.retain(|r| r.status == ProbeStatus::Ok);
    }
    results.sort_by(|a, b| a.model.cmp(&b.model));

    info!(
        scanned,
        reported = results.len(),
        format = %config.format,
        "Writing report"
    );

    match &config.output_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_report(BufWriter::new(file), config.format, &results)?;
        }
        None => write_report(io::stdout().lock(), config.format, &results)?,
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Model;
    use crate::config::{Cli, Command, ScanConfig};
    use crate::discovery::ScanError;
    use async_trait::async_trait;
    use clap::Parser;

    struct FakeAdapter;

    #[async_trait]
    impl PlatformAdapter for FakeAdapter {
        fn name(&self) -> &str { "fake" }

        async fn list_models(&self) -> anyhow::Result<Vec<Model>> {
            Ok(vec![Model::new("ok-model"), Model::new("skip-model"), Model::new("fail-model")])
        }

        async fn probe(&self, model: &Model) -> ProbeResult {
            match model.id.as_str() {
                "ok-model" | "skip-model" => ProbeResult::ok(self.name(), &model.id, Vec::new()),
                _ => ProbeResult::unavailable(self.name(), &model.id, ProbeStatus::Fail, "failed"),
            }
        }
    }

    fn config(argv: &[&str]) -> ScanConfig {
        let mut full = vec!["model-scout", "scan", "--platform", "deepseek"];
        full.extend_from_slice(argv);
        let Command::Scan(args) = Cli::try_parse_from(full).unwrap().command;
        ScanConfig::from_args_with_env(args, |name: &str| {
            (name == "DEEPSEEK_API_KEY").then(|| "token".to_string())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_outputs_filtered_results() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let out_str = out.to_str().unwrap();

        let config = config(&[
            "--output-file", out_str,
            "--out", "json",
            "--exclude", "skip",
            "--filter", "status=ok",
            "--only-ok",
        ]);
        let written = run_scan(&config, Arc::new(FakeAdapter), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(written.len(), 1);

        let data = std::fs::read_to_string(&out).unwrap();
        let results: Vec<ProbeResult> = serde_json::from_str(&data).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].model, "ok-model");
        assert_eq!(results[0].platform, "fake");
    }

    #[tokio::test]
    async fn test_run_writes_sorted_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.yaml");

        let config = config(&["--output-file", out.to_str().unwrap(), "--out", "yaml"]);
        run_scan(&config, Arc::new(FakeAdapter), &CancellationToken::new())
            .await
            .unwrap();

        let data = std::fs::read_to_string(&out).unwrap();
        let results: Vec<ProbeResult> = serde_yaml::from_str(&data).unwrap();
        let models: Vec<&str> = results.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, vec!["fail-model", "ok-model", "skip-model"]);
        assert_eq!(results[0].reason.as_deref(), Some("failed"));
    }

    #[tokio::test]
    async fn test_run_cancelled_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");
        let config = config(&["--output-file", out.to_str().unwrap()]);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_scan(&config, Arc::new(FakeAdapter), &cancel).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<ScanError>(), Some(ScanError::Cancelled { .. })));
        assert!(!out.exists());
    }
}
