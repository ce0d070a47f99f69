//! Observation points, validated series and the dataset envelope.

use super::month::MonthKey;
use serde::{Deserialize, Serialize};

/// One monthly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub date: MonthKey,
    pub value: f64,
}

impl ObservationPoint {
    pub fn new(date: MonthKey, value: f64) -> Self {
        Self { date, value }
    }
}

/// A series that passed the validation gate.
///
/// Non-empty, strictly increasing by month, every value finite. The only
/// constructor lives in [`crate::data::validate`], so holding a `Series`
/// is proof that the checks ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series(Vec<ObservationPoint>);

impl Series {
    pub(crate) fn from_validated(points: Vec<ObservationPoint>) -> Self {
        debug_assert!(!points.is_empty());
        Self(points)
    }

    pub fn points(&self) -> &[ObservationPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> &ObservationPoint {
        &self.0[0]
    }

    pub fn last(&self) -> &ObservationPoint {
        &self.0[self.0.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationPoint> {
        self.0.iter()
    }
}

/// Sampling frequency of a persisted dataset. Only monthly is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
}

/// The persisted artifact: provenance plus a validated series.
///
/// `start` and `end` are derived from the series at construction and cannot
/// be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetEnvelope {
    source: String,
    frequency: Frequency,
    start: MonthKey,
    end: MonthKey,
    series: Series,
}

impl DatasetEnvelope {
    pub fn new(source: impl Into<String>, series: Series) -> Self {
        Self {
            source: source.into(),
            frequency: Frequency::Monthly,
            start: series.first().date,
            end: series.last().date,
            series,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn start(&self) -> MonthKey {
        self.start
    }

    pub fn end(&self) -> MonthKey {
        self.end
    }

    pub fn series(&self) -> &Series {
        &self.series
    }
}
