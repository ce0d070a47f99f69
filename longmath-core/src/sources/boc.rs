//! Bank of Canada Valet observations.
//!
//! The CSV export opens with metadata blocks (terms, series descriptions)
//! before the observation table, so the header line is located by prefix
//! rather than assumed to be line one.

use super::finish_calendar_series;
use crate::config::PipelineConfig;
use crate::data::aggregate::{AggregationMode, Observation};
use crate::data::coerce::coerce_number;
use crate::data::columns::{require_exact_column, resolve_columns, ColumnRole};
use crate::data::csv_text::csv_rows_with_delimiter;
use crate::data::dates::parse_calendar;
use crate::data::error::PipelineError;
use crate::data::header::{header_delimiter, require_header_line, CSV_HEADER_WINDOW, VALET_HEADER_PREFIXES};
use crate::data::provider::TextProvider;
use crate::data::table::HeaderedTable;
use crate::domain::DatasetEnvelope;
use chrono::NaiveDate;

pub const VALET_SOURCE: &str = "Bank of Canada Valet API";

/// One Valet series request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValetRequest {
    pub series: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub aggregation: AggregationMode,
    pub total_return: bool,
}

impl ValetRequest {
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            start: None,
            end: None,
            aggregation: AggregationMode::default(),
            total_return: false,
        }
    }
}

/// Observations CSV endpoint for a series.
pub fn observations_url(base_url: &str, series: &str) -> String {
    format!("{}/observations/{series}/csv", base_url.trim_end_matches('/'))
}

/// Fetch the raw CSV body for a request.
pub fn fetch_valet_csv(
    provider: &dyn TextProvider,
    config: &PipelineConfig,
    req: &ValetRequest,
) -> Result<String, PipelineError> {
    let url = observations_url(&config.http.valet_base_url, &req.series);
    let mut query = Vec::new();
    if let Some(start) = req.start {
        query.push(("start_date", start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = req.end {
        query.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }
    provider.fetch_text(&url, &query)
}

/// Parse a Valet CSV body into cleaned daily observations for `series`.
pub fn parse_valet_csv(text: &str, series: &str) -> Result<Vec<Observation>, PipelineError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_line = require_header_line(&lines, VALET_HEADER_PREFIXES, CSV_HEADER_WINDOW)?;
    tracing::debug!(series, header_line, "located Valet observation header");

    let delimiter = header_delimiter(lines[header_line]);
    let table = csv_rows_with_delimiter(&lines[header_line..].join("\n"), delimiter)?.split_at_header(0);
    let date_col = resolve_columns(table.columns(), &[ColumnRole::new("date", &["date"])])?[0];
    // Series codes share prefixes, so only an exact header counts.
    let value_col = require_exact_column(table.columns(), series, &[date_col])?;

    let observations: Vec<Observation> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let date = parse_calendar(HeaderedTable::cell(row, date_col))?;
            let value = coerce_number(HeaderedTable::cell(row, value_col))?;
            Some(Observation::new(date, value))
        })
        .collect();

    tracing::info!(
        series,
        rows = table.rows().len(),
        kept = observations.len(),
        "cleaned Valet observations"
    );

    if observations.is_empty() {
        return Err(PipelineError::NoUsableRows {
            context: format!("Valet series {series}"),
            scanned: table.rows().len(),
        });
    }
    Ok(observations)
}

/// Fetch, clean, aggregate and validate a Valet series.
pub fn build_valet(
    provider: &dyn TextProvider,
    config: &PipelineConfig,
    req: &ValetRequest,
) -> Result<DatasetEnvelope, PipelineError> {
    let text = fetch_valet_csv(provider, config, req)?;
    let observations = parse_valet_csv(&text, &req.series)?;
    finish_calendar_series(
        VALET_SOURCE.to_string(),
        &observations,
        req.aggregation,
        req.total_return,
        config.min_points,
    )
}
