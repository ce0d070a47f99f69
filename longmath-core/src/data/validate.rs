//! The final gate before persistence. Nothing downstream sees an invalid series.

use super::error::{PipelineError, ValidationFailure};
use crate::domain::{ObservationPoint, Series};

/// Minimum length for generic monthly series.
pub const DEFAULT_MIN_POINTS: usize = 100;

/// Minimum length for the multi-century workbook series.
pub const LONG_HISTORY_MIN_POINTS: usize = 1000;

/// Check a candidate series and seal it.
///
/// Structural checks (ordering, finiteness) run before the length floor, so a
/// short series with a repeated month reports the ordering fault.
pub fn validate(points: Vec<ObservationPoint>, min_points: usize) -> Result<Series, PipelineError> {
    if points.is_empty() {
        return Err(ValidationFailure::EmptySeries.into());
    }

    for (index, pair) in points.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(ValidationFailure::NotIncreasing {
                index: index + 1,
                previous: pair[0].date,
                current: pair[1].date,
            }
            .into());
        }
    }

    if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| !p.value.is_finite()) {
        return Err(ValidationFailure::NonFinite {
            index,
            date: p.date,
            value: p.value,
        }
        .into());
    }

    if points.len() < min_points {
        return Err(PipelineError::InsufficientRows {
            observed: points.len(),
            minimum: min_points,
        });
    }

    Ok(Series::from_validated(points))
}
