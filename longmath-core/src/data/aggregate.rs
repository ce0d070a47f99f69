//! Monthly aggregation.
//!
//! Collapses sub-monthly observations to one point per month under a single
//! policy per series: the arithmetic mean, or the chronologically last value.

use crate::domain::{MonthKey, ObservationPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How same-month observations are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    #[default]
    Mean,
    Last,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Mean => f.write_str("mean"),
            AggregationMode::Last => f.write_str("last"),
        }
    }
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(AggregationMode::Mean),
            "last" => Ok(AggregationMode::Last),
            other => Err(format!("aggregation must be 'mean' or 'last', got '{other}'")),
        }
    }
}

/// A cleaned observation at its original (sub-monthly) date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One point per distinct month, months ascending.
///
/// Input order does not matter: observations are stable-sorted by date first,
/// so under [`AggregationMode::Last`] ties on the same date resolve to the one
/// that appeared later in the source.
pub fn aggregate_monthly(observations: &[Observation], mode: AggregationMode) -> Vec<ObservationPoint> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.date);

    let mut out: Vec<ObservationPoint> = Vec::new();
    let mut current: Option<(MonthKey, f64, usize, f64)> = None;

    let flush = |group: (MonthKey, f64, usize, f64), out: &mut Vec<ObservationPoint>| {
        let (month, sum, count, last) = group;
        let value = match mode {
            AggregationMode::Mean => sum / count as f64,
            AggregationMode::Last => last,
        };
        out.push(ObservationPoint::new(month, value));
    };

    for obs in &sorted {
        let month = MonthKey::from_date(obs.date);
        current = match current {
            Some((m, sum, count, _)) if m == month => Some((m, sum + obs.value, count + 1, obs.value)),
            Some(group) => {
                flush(group, &mut out);
                Some((month, obs.value, 1, obs.value))
            }
            None => Some((month, obs.value, 1, obs.value)),
        };
    }
    if let Some(group) = current {
        flush(group, &mut out);
    }
    out
}
