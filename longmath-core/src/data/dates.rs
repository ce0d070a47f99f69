//! Date normalization to canonical month keys.
//!
//! Three encodings reach the pipeline: calendar dates (ISO-like text or typed
//! spreadsheet timestamps), fractional year-month numbers from the legacy
//! workbook (`1871.01` = January 1871), and `REF_DATE` text from agency tables.

use super::table::Cell;
use crate::domain::MonthKey;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an ISO-like calendar date from text.
pub fn parse_calendar_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(key) = s.parse::<MonthKey>() {
        return Some(key.first_day());
    }
    // Timestamps with fractional seconds or offsets chrono did not accept.
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

/// Calendar date of a cell: typed timestamps directly, text via
/// [`parse_calendar_str`]. Bare numbers are not calendar dates.
pub fn parse_calendar(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_calendar_str(s),
        Cell::Number(_) | Cell::Empty => None,
    }
}

/// `REF_DATE` text: `YYYY-MM` maps to the first of that month, anything else
/// falls back to calendar parsing.
pub fn parse_ref_date(cell: &Cell) -> Option<NaiveDate> {
    if let Cell::Text(s) = cell {
        if let Ok(key) = s.trim().trim_matches('"').parse::<MonthKey>() {
            return Some(key.first_day());
        }
    }
    parse_calendar(cell)
}

/// Month of a fractional `year + month/100` value.
///
/// The two fraction digits are rounded and used as the month when in 1..=12.
/// Otherwise the fraction is read as a share of a 12-month year,
/// `round(frac * 12) + 1` clamped to 1..=12. That fallback is an
/// approximation for malformed rows, not a proven mapping.
pub fn month_from_fraction(value: f64) -> Option<MonthKey> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let year = value.trunc();
    let frac = value - year;
    let two_digit = (frac * 100.0).round() as i64;
    let month = if (1..=12).contains(&two_digit) {
        two_digit
    } else {
        let approx = ((frac * 12.0).round() as i64 + 1).clamp(1, 12);
        tracing::warn!(value, approx, "fraction digits outside 1..=12, using fraction-of-year month");
        approx
    };
    MonthKey::new(year as i32, month as u32)
}

/// Whether [`month_from_fraction`] reads `value` without the fallback.
pub fn fraction_is_exact_month(value: f64) -> bool {
    let frac = value - value.trunc();
    (1..=12).contains(&((frac * 100.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(key: Option<MonthKey>) -> String {
        key.map(|k| k.to_string()).unwrap_or_default()
    }

    #[test]
    fn fractional_january() {
        assert_eq!(ym(month_from_fraction(1871.01)), "1871-01");
    }

    #[test]
    fn fractional_october_written_as_one_digit() {
        assert_eq!(ym(month_from_fraction(1871.1)), "1871-10");
        assert_eq!(ym(month_from_fraction(2023.12)), "2023-12");
    }

    #[test]
    fn out_of_range_digits_use_fraction_of_year() {
        assert!(!fraction_is_exact_month(1871.13));
        // 0.13 * 12 = 1.56 -> 2, plus one.
        assert_eq!(ym(month_from_fraction(1871.13)), "1871-03");
        // Whole year: fraction 0 -> month 1.
        assert_eq!(ym(month_from_fraction(1900.0)), "1900-01");
        // Fraction near one clamps to December.
        assert_eq!(ym(month_from_fraction(1900.99)), "1900-12");
    }

    #[test]
    fn fraction_rejects_non_finite_and_negative() {
        assert!(month_from_fraction(f64::NAN).is_none());
        assert!(month_from_fraction(-5.01).is_none());
    }

    #[test]
    fn calendar_text_forms() {
        let jan3 = NaiveDate::from_ymd_opt(2017, 1, 3).unwrap();
        assert_eq!(parse_calendar_str("2017-01-03"), Some(jan3));
        assert_eq!(parse_calendar_str("\"2017-01-03\""), Some(jan3));
        assert_eq!(parse_calendar_str("2017/01/03"), Some(jan3));
        assert_eq!(parse_calendar_str("2017-01-03 16:30:00"), Some(jan3));
        assert_eq!(parse_calendar_str("2017-01-03T00:00:00Z"), Some(jan3));
        assert_eq!(parse_calendar_str("2017-01-03T00:00:00.000"), Some(jan3));
        assert_eq!(
            parse_calendar_str("2017-01"),
            NaiveDate::from_ymd_opt(2017, 1, 1)
        );
        assert_eq!(parse_calendar_str("not a date"), None);
        assert_eq!(parse_calendar_str(""), None);
    }

    #[test]
    fn typed_timestamp_cells() {
        let dt = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_calendar(&Cell::DateTime(dt)), Some(dt.date()));
        assert_eq!(parse_calendar(&Cell::Number(36525.0)), None);
    }

    #[test]
    fn ref_date_month_and_day_forms() {
        assert_eq!(
            parse_ref_date(&Cell::from("1914-01")),
            NaiveDate::from_ymd_opt(1914, 1, 1)
        );
        assert_eq!(
            parse_ref_date(&Cell::from("2020-06-15")),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
        assert_eq!(parse_ref_date(&Cell::from("2020")), None);
    }
}
