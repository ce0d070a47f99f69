//! Per-source dataset builders. Each turns one kind of input into a
//! validated [`DatasetEnvelope`]; none of them touches the output directory.

pub mod boc;
pub mod rates;
pub mod shiller;
pub mod statcan;

use crate::data::aggregate::{aggregate_monthly, AggregationMode, Observation};
use crate::data::compound::{dedupe_last_write_wins, yield_index};
use crate::data::error::PipelineError;
use crate::data::validate::validate;
use crate::domain::{DatasetEnvelope, ObservationPoint};
use std::path::Path;

/// Shared tail of the calendar-dated sources: aggregate to months, optionally
/// compound the monthly yields, then validate.
pub(crate) fn finish_calendar_series(
    source: String,
    observations: &[Observation],
    aggregation: AggregationMode,
    total_return: bool,
    min_points: usize,
) -> Result<DatasetEnvelope, PipelineError> {
    let monthly = aggregate_monthly(observations, aggregation);
    tracing::info!(
        source = %source,
        observations = observations.len(),
        months = monthly.len(),
        %aggregation,
        "aggregated to monthly"
    );

    let points: Vec<ObservationPoint> = if total_return {
        dedupe_last_write_wins(yield_index(&monthly))
    } else {
        monthly
    };

    let series = validate(points, min_points)?;
    Ok(DatasetEnvelope::new(source, series))
}

/// File name for provenance labels.
pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
