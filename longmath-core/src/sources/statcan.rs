//! Statistics agency tables (`REF_DATE`, `VALUE`, `SYMBOL`, ...).
//!
//! Full-table downloads hold every series of a table in long form. Rows are
//! kept only when their `SYMBOL` cell matches the requested value.

use super::{file_label, finish_calendar_series};
use crate::config::PipelineConfig;
use crate::data::aggregate::{AggregationMode, Observation};
use crate::data::coerce::coerce_number;
use crate::data::columns::{resolve_columns, ColumnRole};
use crate::data::csv_text::{csv_rows, read_csv_file};
use crate::data::dates::parse_ref_date;
use crate::data::error::PipelineError;
use crate::data::header::{normalize_label, require_header, CSV_HEADER_WINDOW};
use crate::data::table::{HeaderedTable, RawTable};
use crate::domain::DatasetEnvelope;
use std::path::Path;

const MARKERS: &[&str] = &["ref_date", "value"];
const REF_DATE: ColumnRole<'static> = ColumnRole::new("ref_date", &["ref_date"]);
const VALUE: ColumnRole<'static> = ColumnRole::new("value", &["value"]);
const SYMBOL: ColumnRole<'static> = ColumnRole::new("symbol", &["symbol"]);

/// Clean observations for rows whose SYMBOL equals `symbol` (trimmed,
/// case-insensitive; an empty filter selects rows with a blank SYMBOL).
pub fn statcan_observations(
    table: &RawTable,
    symbol: &str,
    context: &str,
) -> Result<Vec<Observation>, PipelineError> {
    let header_row = require_header(table.rows(), MARKERS, CSV_HEADER_WINDOW)?;
    let table = table.split_at_header(header_row);
    let cols = resolve_columns(table.columns(), &[REF_DATE, VALUE, SYMBOL])?;
    let (date_col, value_col, symbol_col) = (cols[0], cols[1], cols[2]);
    let wanted = normalize_label(symbol);

    let mut matched = 0usize;
    let observations: Vec<Observation> = table
        .rows()
        .iter()
        .filter(|row| normalize_label(&HeaderedTable::cell(row, symbol_col).render()) == wanted)
        .inspect(|_| matched += 1)
        .filter_map(|row| {
            let date = parse_ref_date(HeaderedTable::cell(row, date_col))?;
            let value = coerce_number(HeaderedTable::cell(row, value_col))?;
            Some(Observation::new(date, value))
        })
        .collect();

    tracing::info!(
        context,
        symbol,
        rows = table.rows().len(),
        matched,
        kept = observations.len(),
        "cleaned agency rows"
    );
    if observations.is_empty() {
        return Err(PipelineError::NoUsableRows {
            context: format!("{context} (SYMBOL = '{symbol}')"),
            scanned: table.rows().len(),
        });
    }
    Ok(observations)
}

fn source_label(label: &str) -> String {
    format!("Statistics Canada ({label})")
}

pub fn statcan_from_text(
    text: &str,
    label: &str,
    symbol: &str,
    aggregation: AggregationMode,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let observations = statcan_observations(&csv_rows(text)?, symbol, label)?;
    finish_calendar_series(source_label(label), &observations, aggregation, false, config.min_points)
}

pub fn build_statcan(
    path: &Path,
    symbol: &str,
    aggregation: AggregationMode,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let label = file_label(path);
    let observations = statcan_observations(&read_csv_file(path)?, symbol, &label)?;
    finish_calendar_series(source_label(&label), &observations, aggregation, false, config.min_points)
}
