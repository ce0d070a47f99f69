//! Cell → number coercion.
//!
//! Anything that is not a finite number is "absent". Rows with an absent
//! required field are dropped whole by the callers; nothing is imputed.

use super::table::Cell;

/// Placeholders agencies use for missing observations (compared lower-cased).
pub const MISSING_SENTINELS: &[&str] = &[".", "..", "...", "na", "n/a", "nan", "x"];

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

pub fn is_missing_sentinel(raw: &str) -> bool {
    let t = raw.trim().trim_matches('"').trim();
    t.is_empty() || MISSING_SENTINELS.iter().any(|s| t.eq_ignore_ascii_case(s))
}

/// Finite numeric value of a cell, or `None`.
pub fn coerce_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => finite(*n),
        Cell::Text(s) => {
            if is_missing_sentinel(s) {
                return None;
            }
            s.trim().trim_matches('"').trim().parse::<f64>().ok().and_then(finite)
        }
        Cell::Empty | Cell::DateTime(_) => None,
    }
}

/// Coerce the listed columns of a row; `None` if any of them is absent.
pub fn coerce_fields(row: &[Cell], columns: &[usize]) -> Option<Vec<f64>> {
    columns
        .iter()
        .map(|&c| row.get(c).and_then(coerce_number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_numeric_text_pass() {
        assert_eq!(coerce_number(&Cell::Number(4.44)), Some(4.44));
        assert_eq!(coerce_number(&Cell::from(" 1.3435 ")), Some(1.3435));
        assert_eq!(coerce_number(&Cell::from("\"2.5\"")), Some(2.5));
        assert_eq!(coerce_number(&Cell::from("-0.25")), Some(-0.25));
    }

    #[test]
    fn sentinels_are_absent() {
        for s in [".", "..", "NA", "n/a", "x", ""] {
            assert_eq!(coerce_number(&Cell::from(s)), None, "sentinel {s:?}");
        }
    }

    #[test]
    fn non_finite_is_absent() {
        assert_eq!(coerce_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(coerce_number(&Cell::Number(f64::INFINITY)), None);
        assert_eq!(coerce_number(&Cell::from("inf")), None);
        assert_eq!(coerce_number(&Cell::from("-infinity")), None);
        assert_eq!(coerce_number(&Cell::from("NaN")), None);
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(coerce_number(&Cell::from("1,234.5")), None);
        assert_eq!(coerce_number(&Cell::from("abc")), None);
        assert_eq!(coerce_number(&Cell::Empty), None);
    }

    #[test]
    fn row_with_any_absent_field_is_dropped() {
        let row = vec![Cell::Number(1871.01), Cell::Number(4.44), Cell::from(".")];
        assert_eq!(coerce_fields(&row, &[0, 1]), Some(vec![1871.01, 4.44]));
        assert_eq!(coerce_fields(&row, &[0, 1, 2]), None);
        assert_eq!(coerce_fields(&row, &[0, 7]), None);
    }
}
