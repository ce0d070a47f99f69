//! Generic two-column rate files (`DATE,VALUE` style, `.` for missing).

use super::{file_label, finish_calendar_series};
use crate::config::PipelineConfig;
use crate::data::aggregate::{AggregationMode, Observation};
use crate::data::coerce::coerce_number;
use crate::data::columns::{first_non_date_column, resolve_columns, DATE_ROLE};
use crate::data::csv_text::{csv_rows, read_csv_file};
use crate::data::dates::parse_calendar;
use crate::data::error::PipelineError;
use crate::data::table::{HeaderedTable, RawTable};
use crate::domain::DatasetEnvelope;
use std::path::Path;

/// Clean observations from a rate table whose first row is the header.
pub fn rate_observations(table: &RawTable, context: &str) -> Result<Vec<Observation>, PipelineError> {
    let table = table.split_at_header(0);
    let date_col = resolve_columns(table.columns(), &[DATE_ROLE])?[0];
    let value_col = first_non_date_column(table.columns(), date_col)?;
    tracing::debug!(
        date = %table.columns()[date_col],
        value = %table.columns()[value_col],
        "resolved rate columns"
    );

    let observations: Vec<Observation> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let date = parse_calendar(HeaderedTable::cell(row, date_col))?;
            let value = coerce_number(HeaderedTable::cell(row, value_col))?;
            Some(Observation::new(date, value))
        })
        .collect();

    tracing::info!(context, rows = table.rows().len(), kept = observations.len(), "cleaned rate rows");
    if observations.is_empty() {
        return Err(PipelineError::NoUsableRows {
            context: context.to_string(),
            scanned: table.rows().len(),
        });
    }
    Ok(observations)
}

/// Build from CSV text already in memory.
pub fn rate_csv_from_text(
    text: &str,
    label: &str,
    aggregation: AggregationMode,
    total_return: bool,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let observations = rate_observations(&csv_rows(text)?, label)?;
    finish_calendar_series(
        format!("Rate CSV ({label})"),
        &observations,
        aggregation,
        total_return,
        config.min_points,
    )
}

pub fn build_rate_csv(
    path: &Path,
    aggregation: AggregationMode,
    total_return: bool,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let label = file_label(path);
    let observations = rate_observations(&read_csv_file(path)?, &label)?;
    finish_calendar_series(
        format!("Rate CSV ({label})"),
        &observations,
        aggregation,
        total_return,
        config.min_points,
    )
}
