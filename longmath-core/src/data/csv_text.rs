//! CSV text → [`RawTable`]. Every field arrives as text; typing happens later.

use super::error::PipelineError;
use super::table::{Cell, RawTable};
use std::path::Path;

/// Parse CSV text with a ragged-tolerant reader. No row is treated as the
/// header here; header discovery is a separate stage.
pub fn csv_rows(text: &str) -> Result<RawTable, PipelineError> {
    csv_rows_with_delimiter(text, b',')
}

/// [`csv_rows`] with an explicit field delimiter.
pub fn csv_rows_with_delimiter(text: &str, delimiter: u8) -> Result<RawTable, PipelineError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| PipelineError::Read {
            what: format!("CSV record {}", i + 1),
            reason: e.to_string(),
        })?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(RawTable::new(rows))
}

/// Read a CSV file from disk.
pub fn read_csv_file(path: &Path) -> Result<RawTable, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Read {
        what: path.display().to_string(),
        reason: e.to_string(),
    })?;
    csv_rows(&text)
}
