//! Column resolution: map semantic roles to actual header columns.

use super::error::PipelineError;
use super::header::normalize_label;

/// A semantic role and its candidate header names, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRole<'a> {
    pub role: &'a str,
    pub candidates: &'a [&'a str],
}

impl<'a> ColumnRole<'a> {
    pub const fn new(role: &'a str, candidates: &'a [&'a str]) -> Self {
        Self { role, candidates }
    }
}

pub const DATE_ROLE: ColumnRole<'static> = ColumnRole::new("date", &["date", "observation_date"]);

/// Find the column for a candidate list, skipping columns in `claimed`.
///
/// Exact (case-insensitive, trimmed) matches are tried for every candidate
/// before any substring match, and earlier candidates beat later ones.
pub fn find_column(columns: &[String], candidates: &[&str], claimed: &[usize]) -> Option<usize> {
    let normalized: Vec<String> = columns.iter().map(|c| normalize_label(c)).collect();
    let wanted: Vec<String> = candidates.iter().map(|c| normalize_label(c)).collect();
    let open = |i: &usize| !claimed.contains(i);

    for cand in candidates {
        if let Some(i) = find_exact_column(columns, cand, claimed) {
            return Some(i);
        }
    }
    for cand in wanted.iter().filter(|c| !c.is_empty()) {
        if let Some(i) = (0..normalized.len())
            .filter(open)
            .find(|&i| normalized[i].contains(cand.as_str()))
        {
            return Some(i);
        }
    }
    None
}

/// Exact (case-insensitive, trimmed, quote-stripped) match only.
pub fn find_exact_column(columns: &[String], name: &str, claimed: &[usize]) -> Option<usize> {
    let wanted = normalize_label(name);
    columns
        .iter()
        .enumerate()
        .find(|(i, c)| !claimed.contains(i) && normalize_label(c) == wanted)
        .map(|(i, _)| i)
}

/// [`find_exact_column`], failing with every present column listed. For
/// identifiers such as series codes, where a substring hit would silently
/// select a different series.
pub fn require_exact_column(columns: &[String], name: &str, claimed: &[usize]) -> Result<usize, PipelineError> {
    find_exact_column(columns, name, claimed).ok_or_else(|| PipelineError::ColumnNotFound {
        role: name.to_string(),
        available: columns.to_vec(),
    })
}

/// Resolve every role to a distinct column, in role order.
///
/// Roles are resolved in sequence and a column claimed by an earlier role is
/// not offered to later ones, so a loose substring candidate such as `d`
/// cannot steal the `Date` column.
pub fn resolve_columns(columns: &[String], roles: &[ColumnRole<'_>]) -> Result<Vec<usize>, PipelineError> {
    let mut resolved = Vec::with_capacity(roles.len());
    for role in roles {
        let idx = find_column(columns, role.candidates, &resolved).ok_or_else(|| {
            PipelineError::ColumnNotFound {
                role: role.role.to_string(),
                available: columns.to_vec(),
            }
        })?;
        resolved.push(idx);
    }
    Ok(resolved)
}

/// The value column of a plain two-column file: the first non-blank column
/// that is not the date column.
pub fn first_non_date_column(columns: &[String], date_column: usize) -> Result<usize, PipelineError> {
    columns
        .iter()
        .enumerate()
        .find(|(i, name)| *i != date_column && !name.trim().is_empty())
        .map(|(i, _)| i)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            role: "value".to_string(),
            available: columns.to_vec(),
        })
}
