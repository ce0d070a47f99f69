//! Header discovery.
//!
//! Real-world exports put metadata, disclaimers or title blocks above the
//! observation table. The locator scans a bounded window from the top and
//! returns the first row that looks like the header. Both functions are pure
//! so their tie-break rules (first match wins, window is exclusive) stay
//! pinned by tests.

use super::error::PipelineError;
use super::table::Cell;
use std::collections::HashSet;

/// Rows scanned when looking for a header in a spreadsheet sheet.
pub const SPREADSHEET_HEADER_WINDOW: usize = 50;

/// Lines scanned when looking for a header in CSV text.
pub const CSV_HEADER_WINDOW: usize = 200;

/// Rows reproduced verbatim in a `HeaderNotFound` error.
pub const PREVIEW_ROWS: usize = 15;

/// Line prefixes that open the observation block of a Valet CSV export.
pub const VALET_HEADER_PREFIXES: &[&str] = &["date,", "date\",\"", "\"date\",", "date;"];

/// Trim, strip one layer of surrounding quotes, lower-case.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_lowercase()
}

/// Index of the first row within `window` whose normalized cell set contains
/// every marker.
pub fn locate_header(rows: &[Vec<Cell>], markers: &[&str], window: usize) -> Option<usize> {
    let wanted: Vec<String> = markers.iter().map(|m| normalize_label(m)).collect();
    rows.iter().take(window).position(|row| {
        let present: HashSet<String> = row.iter().map(|c| normalize_label(&c.render())).collect();
        wanted.iter().all(|m| present.contains(m))
    })
}

/// Index of the first line within `window` that starts with one of `prefixes`
/// once surrounding whitespace and quotes are stripped and case is folded.
pub fn locate_header_line(lines: &[&str], prefixes: &[&str], window: usize) -> Option<usize> {
    let wanted: Vec<String> = prefixes.iter().map(|p| p.to_lowercase()).collect();
    lines.iter().take(window).position(|line| {
        let trimmed = line.trim();
        let unquoted = trimmed.trim_matches('"').to_lowercase();
        let raw = trimmed.to_lowercase();
        wanted
            .iter()
            .any(|p| unquoted.starts_with(p.as_str()) || raw.starts_with(p.as_str()))
    })
}

/// Field delimiter of a located header line: whichever of `,` or `;` comes
/// first, comma when neither appears.
pub fn header_delimiter(line: &str) -> u8 {
    match line.find(|c: char| c == ',' || c == ';') {
        Some(i) if line.as_bytes()[i] == b';' => b';',
        _ => b',',
    }
}

/// [`locate_header`], failing with a preview of the scanned rows.
pub fn require_header(
    rows: &[Vec<Cell>],
    markers: &[&str],
    window: usize,
) -> Result<usize, PipelineError> {
    locate_header(rows, markers, window).ok_or_else(|| PipelineError::HeaderNotFound {
        window,
        preview: rows
            .iter()
            .take(PREVIEW_ROWS.min(window))
            .map(|row| row.iter().map(Cell::render).collect::<Vec<_>>().join(","))
            .collect(),
    })
}

/// [`locate_header_line`], failing with the first lines verbatim.
pub fn require_header_line(
    lines: &[&str],
    prefixes: &[&str],
    window: usize,
) -> Result<usize, PipelineError> {
    locate_header_line(lines, prefixes, window).ok_or_else(|| PipelineError::HeaderNotFound {
        window,
        preview: lines
            .iter()
            .take(PREVIEW_ROWS.min(window))
            .map(|l| l.to_string())
            .collect(),
    })
}
