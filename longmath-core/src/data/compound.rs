//! Total-return index construction.
//!
//! Two recurrences, both seeded at 1.0:
//! - price + dividend: `I[t] = I[t-1] * (P[t] + D[t]) / P[t-1]`
//! - annualized yield: `I[t] = I[t-1] * (1 + r[t])` with
//!   `r = (1 + y/100)^(1/12) - 1`, floored at zero for non-positive yields.

use super::error::PipelineError;
use crate::domain::{MonthKey, ObservationPoint};
use std::collections::BTreeMap;

/// One month of equity price and dividend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDividend {
    pub month: MonthKey,
    pub price: f64,
    pub dividend: f64,
}

impl PriceDividend {
    pub fn new(month: MonthKey, price: f64, dividend: f64) -> Self {
        Self {
            month,
            price,
            dividend,
        }
    }
}

/// Total-return index from chronologically ordered price/dividend rows.
///
/// The first month is seeded at 1.0. Every price must be positive: each one is
/// the divisor of the following step, and a non-positive price fails with
/// `InvalidPriorPrice` at the month it appears.
pub fn price_dividend_index(rows: &[PriceDividend]) -> Result<Vec<ObservationPoint>, PipelineError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut prev_price: Option<f64> = None;
    let mut index = 1.0;

    for row in rows {
        if row.price <= 0.0 {
            return Err(PipelineError::InvalidPriorPrice {
                month: row.month,
                price: row.price,
            });
        }
        if let Some(prev) = prev_price {
            index *= (row.price + row.dividend) / prev;
        }
        prev_price = Some(row.price);
        out.push(ObservationPoint::new(row.month, index));
    }
    Ok(out)
}

/// Effective monthly return of an annualized percentage yield.
pub fn monthly_return_from_yield(annual_pct: f64) -> f64 {
    if annual_pct <= 0.0 {
        return 0.0;
    }
    (1.0 + annual_pct / 100.0).powf(1.0 / 12.0) - 1.0
}

/// Compound monthly yields into an index. The seed 1.0 sits before the first
/// period, so the first point already carries one month of return.
pub fn yield_index(yields: &[ObservationPoint]) -> Vec<ObservationPoint> {
    let mut index = 1.0;
    yields
        .iter()
        .map(|p| {
            index *= 1.0 + monthly_return_from_yield(p.value);
            ObservationPoint::new(p.date, index)
        })
        .collect()
}

/// Re-key points by month, later points overwriting earlier ones, and return
/// them in ascending month order.
pub fn dedupe_last_write_wins(points: Vec<ObservationPoint>) -> Vec<ObservationPoint> {
    let mut by_month: BTreeMap<MonthKey, f64> = BTreeMap::new();
    for p in points {
        by_month.insert(p.date, p.value);
    }
    by_month
        .into_iter()
        .map(|(date, value)| ObservationPoint::new(date, value))
        .collect()
}
