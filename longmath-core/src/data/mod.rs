//! The normalization pipeline, stage by stage.
//!
//! table → header → columns → coerce → dates → aggregate → (compound) → validate
//!
//! Each stage is a pure transformation producing new values; failures
//! short-circuit with a [`PipelineError`].

pub mod aggregate;
pub mod columns;
pub mod coerce;
pub mod compound;
pub mod csv_text;
pub mod dates;
pub mod error;
pub mod header;
pub mod provider;
pub mod spreadsheet;
pub mod table;
pub mod validate;

pub use aggregate::{aggregate_monthly, AggregationMode, Observation};
pub use columns::{first_non_date_column, require_exact_column, resolve_columns, ColumnRole};
pub use compound::{dedupe_last_write_wins, price_dividend_index, yield_index, PriceDividend};
pub use error::{PipelineError, ValidationFailure};
pub use header::{locate_header, locate_header_line};
pub use provider::{HttpTextProvider, StaticTextProvider, TextProvider};
pub use table::{Cell, HeaderedTable, RawTable};
pub use validate::validate;
