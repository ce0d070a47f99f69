//! Spreadsheet workbook → [`RawTable`].

use super::error::PipelineError;
use super::table::{Cell, RawTable};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::path::Path;

/// Sheet holding the observation table in the long-history workbook.
pub const DATA_SHEET: &str = "Data";

/// Read one sheet of an `.xls`/`.xlsx`/`.ods` workbook (format auto-detected).
///
/// Uses the sheet named `preferred_sheet` (case-insensitive) when present,
/// otherwise the first sheet.
pub fn read_workbook_sheet(path: &Path, preferred_sheet: &str) -> Result<RawTable, PipelineError> {
    let read_err = |reason: String| PipelineError::Read {
        what: path.display().to_string(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| read_err(e.to_string()))?;
    let names = workbook.sheet_names().to_vec();
    let sheet = names
        .iter()
        .find(|n| n.trim().eq_ignore_ascii_case(preferred_sheet))
        .or_else(|| names.first())
        .cloned()
        .ok_or_else(|| read_err("workbook has no sheets".into()))?;

    if !sheet.trim().eq_ignore_ascii_case(preferred_sheet) {
        tracing::warn!(sheet = %sheet, preferred_sheet, "preferred sheet missing, using first sheet");
    }

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| read_err(format!("sheet '{sheet}': {e}")))?;
    let (height, width) = range.get_size();
    tracing::debug!(sheet = %sheet, height, width, "read sheet");

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable::new(rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from(s.as_str()),
        Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Empty),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::DateTime)
            .unwrap_or_else(|_| Cell::from(s.as_str())),
        _ => Cell::Empty,
    }
}
