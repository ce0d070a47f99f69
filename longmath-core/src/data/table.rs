//! Loosely-typed 2-D tables handed over by the CSV and spreadsheet adapters.

use chrono::NaiveDateTime;

static EMPTY_CELL: Cell = Cell::Empty;

/// A single cell of unknown provenance.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render the cell as text, for header matching and diagnostic previews.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{n}"),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Rows of cells in source order. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Slice the table at a located header row: that row becomes the column
    /// names, everything below it the data rows. Rows above are discarded.
    pub fn split_at_header(&self, header_row: usize) -> HeaderedTable {
        let columns = self
            .rows
            .get(header_row)
            .map(|row| row.iter().map(|c| c.render().trim().to_string()).collect())
            .unwrap_or_default();
        let rows = self
            .rows
            .get(header_row + 1..)
            .map(|r| r.to_vec())
            .unwrap_or_default();
        HeaderedTable { columns, rows }
    }
}

/// A table whose header row has been located.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl HeaderedTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Cell lookup that treats a short row as padded with empties.
    pub fn cell<'a>(row: &'a [Cell], column: usize) -> &'a Cell {
        row.get(column).unwrap_or(&EMPTY_CELL)
    }
}
