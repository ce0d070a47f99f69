//! Long-history equity workbook (`ie_data.xls`).
//!
//! The "Data" sheet carries a title block above the real header row, dates
//! encoded as `year.month` numbers, and nominal price (P), dividend (D) and
//! CPI columns. Two datasets come out of it: a compounded total-return index
//! and the CPI level.

use crate::config::PipelineConfig;
use crate::data::coerce::coerce_fields;
use crate::data::columns::{resolve_columns, ColumnRole};
use crate::data::compound::{dedupe_last_write_wins, price_dividend_index, PriceDividend};
use crate::data::dates::month_from_fraction;
use crate::data::error::PipelineError;
use crate::data::header::{require_header, SPREADSHEET_HEADER_WINDOW};
use crate::data::spreadsheet::{read_workbook_sheet, DATA_SHEET};
use crate::data::table::RawTable;
use crate::data::validate::validate;
use crate::domain::{DatasetEnvelope, MonthKey, ObservationPoint};
use std::path::Path;

pub const SHILLER_SOURCE: &str = "Yale / Shiller (ie_data.xls)";
pub const SHILLER_CPI_SOURCE: &str = "Yale / Shiller (ie_data.xls) CPI";

const TOTAL_RETURN_MARKERS: &[&str] = &["date", "p", "d"];
const CPI_MARKERS: &[&str] = &["date", "cpi"];

const DATE: ColumnRole<'static> = ColumnRole::new("date", &["date"]);
const PRICE: ColumnRole<'static> = ColumnRole::new("price", &["p", "price"]);
const DIVIDEND: ColumnRole<'static> = ColumnRole::new("dividend", &["d", "dividend"]);
const CPI: ColumnRole<'static> = ColumnRole::new("cpi", &["cpi", "consumer price index"]);

/// Locate the header, resolve `roles`, and keep rows where the fractional
/// date and every other role coerce cleanly. Rows come back stable-sorted by
/// month with the remaining role values in role order.
fn monthly_rows(
    table: &RawTable,
    markers: &[&str],
    roles: &[ColumnRole<'_>],
) -> Result<Vec<(MonthKey, Vec<f64>)>, PipelineError> {
    let header_row = require_header(table.rows(), markers, SPREADSHEET_HEADER_WINDOW)?;
    let table = table.split_at_header(header_row);
    let cols = resolve_columns(table.columns(), roles)?;
    tracing::info!(header_row, columns = ?cols, "located workbook header");

    let mut rows: Vec<(MonthKey, Vec<f64>)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let values = coerce_fields(row, &cols)?;
            let month = month_from_fraction(values[0])?;
            Some((month, values[1..].to_vec()))
        })
        .collect();

    tracing::info!(rows = table.rows().len(), kept = rows.len(), "cleaned workbook rows");
    if rows.is_empty() {
        return Err(PipelineError::NoUsableRows {
            context: "workbook Data sheet".to_string(),
            scanned: table.rows().len(),
        });
    }

    rows.sort_by_key(|(month, _)| *month);
    Ok(rows)
}

/// Total-return index from an already-loaded sheet.
pub fn total_return_from_table(
    table: &RawTable,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let rows = monthly_rows(table, TOTAL_RETURN_MARKERS, &[DATE, PRICE, DIVIDEND])?;
    let pairs: Vec<PriceDividend> = rows
        .iter()
        .map(|(month, v)| PriceDividend::new(*month, v[0], v[1]))
        .collect();

    let points = dedupe_last_write_wins(price_dividend_index(&pairs)?);
    let series = validate(points, config.min_points_long_history)?;
    Ok(DatasetEnvelope::new(SHILLER_SOURCE, series))
}

/// CPI level series from an already-loaded sheet.
pub fn cpi_from_table(
    table: &RawTable,
    config: &PipelineConfig,
) -> Result<DatasetEnvelope, PipelineError> {
    let rows = monthly_rows(table, CPI_MARKERS, &[DATE, CPI])?;
    let points = dedupe_last_write_wins(
        rows.iter()
            .map(|(month, v)| ObservationPoint::new(*month, v[0]))
            .collect(),
    );
    let series = validate(points, config.min_points_long_history)?;
    Ok(DatasetEnvelope::new(SHILLER_CPI_SOURCE, series))
}

pub fn build_total_return(path: &Path, config: &PipelineConfig) -> Result<DatasetEnvelope, PipelineError> {
    total_return_from_table(&read_workbook_sheet(path, DATA_SHEET)?, config)
}

pub fn build_cpi(path: &Path, config: &PipelineConfig) -> Result<DatasetEnvelope, PipelineError> {
    cpi_from_table(&read_workbook_sheet(path, DATA_SHEET)?, config)
}
