//! Domain types: canonical month keys, observation points, validated series
//! and the persisted dataset envelope.

pub mod month;
pub mod series;

pub use month::{MonthKey, MonthParseError};
pub use series::{DatasetEnvelope, Frequency, ObservationPoint, Series};
