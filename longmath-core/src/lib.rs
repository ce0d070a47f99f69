//! longmath core: normalization of heterogeneous historical economic data
//! into validated monthly series.
//!
//! - Domain types (month keys, observation points, validated series, envelopes)
//! - Pipeline stages (header location, column resolution, value coercion,
//!   date normalization, monthly aggregation, compounding, validation)
//! - Source adapters (CSV text, spreadsheet workbooks, HTTP text fetch)
//! - Per-source dataset builders and the sequential batch orchestrator
//! - Atomic JSON persistence

pub mod batch;
pub mod config;
pub mod data;
pub mod domain;
pub mod sources;
pub mod writer;

pub use batch::{build_all, build_dataset, BuildProgress, BuildSummary, StdoutProgress};
pub use config::{BuildManifest, DatasetKind, DatasetSpec, HttpConfig, PipelineConfig};
pub use data::{AggregationMode, PipelineError, ValidationFailure};
pub use domain::{DatasetEnvelope, MonthKey, ObservationPoint, Series};
pub use writer::{read_dataset, write_dataset, WriteReport};
