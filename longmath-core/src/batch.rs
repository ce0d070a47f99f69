//! Batch orchestrator: build every manifest dataset in order and persist it.
//!
//! Datasets run sequentially. The first failure stops the batch; datasets
//! written before it stay on disk, nothing after it is attempted.

use crate::config::{BuildManifest, DatasetKind, PipelineConfig};
use crate::data::error::PipelineError;
use crate::data::provider::TextProvider;
use crate::domain::DatasetEnvelope;
use crate::sources::boc::{build_valet, ValetRequest};
use crate::sources::{rates, shiller, statcan};
use crate::writer::{write_dataset, WriteReport};
use std::fs;
use std::path::Path;

/// Progress callback for batch builds.
pub trait BuildProgress: Send {
    /// Called before a dataset is built.
    fn on_start(&self, name: &str, index: usize, total: usize);

    /// Called when a dataset has been written, or has failed.
    fn on_complete(&self, name: &str, index: usize, total: usize, result: &Result<WriteReport, PipelineError>);

    /// Called once every dataset has been written.
    fn on_batch_complete(&self, summary: &BuildSummary);
}

/// Prints progress lines to stdout.
pub struct StdoutProgress;

impl BuildProgress for StdoutProgress {
    fn on_start(&self, name: &str, index: usize, total: usize) {
        println!("[{}/{}] Building {name}...", index + 1, total);
    }

    fn on_complete(
        &self,
        name: &str,
        _index: usize,
        _total: usize,
        result: &Result<WriteReport, PipelineError>,
    ) {
        match result {
            Ok(r) => println!(
                "  OK: {name} -> {} ({} points) [{} → {}]",
                r.path.display(),
                r.points,
                r.start,
                r.end
            ),
            Err(e) => println!("  FAIL: {name}: {e}"),
        }
    }

    fn on_batch_complete(&self, summary: &BuildSummary) {
        println!("\nBuild complete: {}/{} datasets written", summary.reports.len(), summary.total);
    }
}

/// Outcome of a batch that ran to completion.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub total: usize,
    pub reports: Vec<WriteReport>,
}

/// Build one dataset in memory. A kind without its own aggregation uses the
/// configured default.
pub fn build_dataset(
    kind: &DatasetKind,
    config: &PipelineConfig,
    provider: &dyn TextProvider,
) -> Result<DatasetEnvelope, PipelineError> {
    match kind {
        DatasetKind::Boc {
            series,
            start,
            end,
            agg,
            total_return,
        } => {
            let req = ValetRequest {
                series: series.clone(),
                start: *start,
                end: *end,
                aggregation: agg.unwrap_or(config.aggregation),
                total_return: *total_return,
            };
            build_valet(provider, config, &req)
        }
        DatasetKind::ShillerTotalReturn { path } => shiller::build_total_return(path, config),
        DatasetKind::ShillerCpi { path } => shiller::build_cpi(path, config),
        DatasetKind::RateCsv {
            path,
            agg,
            total_return,
        } => rates::build_rate_csv(path, agg.unwrap_or(config.aggregation), *total_return, config),
        DatasetKind::Statcan { path, symbol, agg } => {
            statcan::build_statcan(path, symbol, agg.unwrap_or(config.aggregation), config)
        }
    }
}

/// Build and write every dataset of `manifest` under `out_dir`.
pub fn build_all(
    manifest: &BuildManifest,
    out_dir: &Path,
    provider: &dyn TextProvider,
    progress: &dyn BuildProgress,
) -> Result<BuildSummary, PipelineError> {
    manifest.check()?;
    fs::create_dir_all(out_dir).map_err(|e| PipelineError::Write {
        what: out_dir.display().to_string(),
        reason: format!("failed to create output directory: {e}"),
    })?;

    let total = manifest.datasets.len();
    tracing::info!(total, out_dir = %out_dir.display(), provider = provider.name(), "starting batch");
    let mut reports = Vec::with_capacity(total);

    for (i, ds) in manifest.datasets.iter().enumerate() {
        progress.on_start(&ds.name, i, total);
        tracing::info!(dataset = %ds.name, index = i + 1, total, "building dataset");

        let result = build_dataset(&ds.kind, &manifest.pipeline, provider)
            .and_then(|envelope| write_dataset(&envelope, &out_dir.join(&ds.output)));
        progress.on_complete(&ds.name, i, total, &result);

        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(dataset = %ds.name, error = %e, "aborting batch");
                return Err(e.in_dataset(&ds.name));
            }
        }
    }

    let summary = BuildSummary { total, reports };
    progress.on_batch_complete(&summary);
    Ok(summary)
}
