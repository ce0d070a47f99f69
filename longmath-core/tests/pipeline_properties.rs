//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Validated series are strictly increasing and finite, and the envelope
//!    bounds equal the first and last points
//! 2. Monthly aggregation emits exactly one point per distinct month, ascending
//! 3. Fractional dates map every `YYYY.MM` value to a month in 1..=12
//! 4. Yield compounding never decreases the index

use chrono::{Datelike, NaiveDate};
use longmath_core::data::aggregate::{aggregate_monthly, AggregationMode, Observation};
use longmath_core::data::compound::yield_index;
use longmath_core::data::dates::{fraction_is_exact_month, month_from_fraction};
use longmath_core::data::validate::validate;
use longmath_core::domain::{DatasetEnvelope, MonthKey, ObservationPoint};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2030, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_observations() -> impl Strategy<Value = Vec<Observation>> {
    prop::collection::vec(
        (arb_date(), -1000.0..1000.0_f64).prop_map(|(d, v)| Observation::new(d, v)),
        1..300,
    )
}

fn arb_mode() -> impl Strategy<Value = AggregationMode> {
    prop_oneof![Just(AggregationMode::Mean), Just(AggregationMode::Last)]
}

fn arb_points() -> impl Strategy<Value = Vec<ObservationPoint>> {
    prop::collection::vec((1800i32..2100, 1u32..=12, -1e6..1e6_f64), 0..200).prop_map(|raw| {
        raw.into_iter()
            .map(|(y, m, v)| ObservationPoint::new(MonthKey::new(y, m).unwrap(), v))
            .collect()
    })
}

// ── 1. Validator Output ──────────────────────────────────────────────

proptest! {
    /// Whatever the validator accepts is strictly increasing and finite, and
    /// the envelope derived from it agrees with its endpoints.
    #[test]
    fn accepted_series_are_monotone_and_bounded(points in arb_points()) {
        if let Ok(series) = validate(points.clone(), 1) {
            for pair in series.points().windows(2) {
                prop_assert!(pair[0].date < pair[1].date);
            }
            prop_assert!(series.iter().all(|p| p.value.is_finite()));

            let env = DatasetEnvelope::new("prop", series.clone());
            prop_assert_eq!(env.start(), series.first().date);
            prop_assert_eq!(env.end(), series.last().date);
            prop_assert_eq!(series.points(), &points[..]);
        }
    }

    /// Sorted, de-duplicated input is always accepted.
    #[test]
    fn sorted_unique_points_are_accepted(points in arb_points()) {
        let mut by_month: Vec<ObservationPoint> = Vec::new();
        let mut seen = BTreeSet::new();
        let mut sorted = points;
        sorted.sort_by_key(|p| p.date);
        for p in sorted {
            if seen.insert(p.date) {
                by_month.push(p);
            }
        }
        prop_assume!(!by_month.is_empty());
        prop_assert!(validate(by_month, 1).is_ok());
    }
}

// ── 2. Aggregation Cardinality ───────────────────────────────────────

proptest! {
    /// One output point per distinct input month, in ascending order.
    #[test]
    fn one_point_per_month(obs in arb_observations(), mode in arb_mode()) {
        let months: BTreeSet<(i32, u32)> = obs.iter().map(|o| (o.date.year(), o.date.month())).collect();
        let out = aggregate_monthly(&obs, mode);

        prop_assert_eq!(out.len(), months.len());
        for pair in out.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        let out_months: BTreeSet<(i32, u32)> = out.iter().map(|p| (p.date.year(), p.date.month())).collect();
        prop_assert_eq!(out_months, months);
    }

    /// The monthly mean lies within the month's min and max.
    #[test]
    fn mean_is_bounded_by_month_extremes(obs in arb_observations()) {
        for point in aggregate_monthly(&obs, AggregationMode::Mean) {
            let values: Vec<f64> = obs
                .iter()
                .filter(|o| MonthKey::from_date(o.date) == point.date)
                .map(|o| o.value)
                .collect();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(point.value >= lo - 1e-9 && point.value <= hi + 1e-9);
        }
    }
}

// ── 3. Fractional Dates ──────────────────────────────────────────────

proptest! {
    /// Two-digit fractions 01..12 read back as that exact month.
    #[test]
    fn two_digit_fractions_are_exact(year in 1800i32..2100, month in 1u32..=12) {
        let value = year as f64 + month as f64 / 100.0;
        prop_assert!(fraction_is_exact_month(value));
        let key = month_from_fraction(value).unwrap();
        prop_assert_eq!(key.year(), year);
        prop_assert_eq!(key.month(), month);
    }

    /// Any non-negative fractional value maps to some valid month.
    #[test]
    fn every_fraction_maps_to_a_month(year in 1800i32..2100, frac in 0.0..1.0_f64) {
        let key = month_from_fraction(year as f64 + frac).unwrap();
        prop_assert!((1..=12).contains(&key.month()));
    }
}

// ── 4. Yield Compounding ─────────────────────────────────────────────

proptest! {
    /// Non-negative monthly returns never shrink the index.
    #[test]
    fn yield_index_is_non_decreasing(yields in prop::collection::vec(-5.0..25.0_f64, 1..240)) {
        let points: Vec<ObservationPoint> = yields
            .iter()
            .enumerate()
            .map(|(i, y)| ObservationPoint::new(MonthKey::new(1950 + (i / 12) as i32, (i % 12) as u32 + 1).unwrap(), *y))
            .collect();
        let index = yield_index(&points);
        prop_assert_eq!(index.len(), points.len());
        prop_assert!(index[0].value >= 1.0);
        for pair in index.windows(2) {
            prop_assert!(pair[1].value >= pair[0].value);
        }
    }
}
