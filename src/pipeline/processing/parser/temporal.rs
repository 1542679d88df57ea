use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{defaulted, DefaultReason, FieldKind, FieldResult};
use crate::constants::{DEFAULT_END_YEAR, DEFAULT_START_YEAR, MAX_PLAUSIBLE_YEAR, MIN_PLAUSIBLE_YEAR};
use crate::domain::YearsValue;

/// Temporal coverage of one initiative.
///
/// Built from a set of distinct years: `start_year`/`end_year` are its bounds,
/// `temporal_span` counts every year in between (inclusive) and `temporal_gaps`
/// lists the years in that span with no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalInterval {
    pub start_year: i32,
    pub end_year: i32,
    pub temporal_span: i32,
    pub total_years: usize,
    pub available_years: Vec<i32>,
    pub temporal_gaps: Vec<i32>,
}

impl TemporalInterval {
    /// Build an interval from any collection of years.
    ///
    /// `None` when it is empty or its span does not fit an `i32`.
    pub fn from_years<I>(years: I) -> Option<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let years: BTreeSet<i32> = years.into_iter().collect();
        let start_year = *years.first()?;
        let end_year = *years.last()?;
        let temporal_span = end_year.checked_sub(start_year)?.checked_add(1)?;
        let temporal_gaps = (start_year..=end_year).filter(|y| !years.contains(y)).collect();

        Some(Self {
            start_year,
            end_year,
            temporal_span,
            total_years: years.len(),
            available_years: years.into_iter().collect(),
            temporal_gaps,
        })
    }

    /// Placeholder interval used when a record has no valid year.
    /// It does not describe real coverage.
    pub fn degenerate() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            temporal_span: 1,
            total_years: 1,
            available_years: vec![DEFAULT_START_YEAR],
            temporal_gaps: Vec::new(),
        }
    }

    /// Share of the initiative's own span that has data, in percent
    pub fn coverage_percentage(&self) -> f64 {
        if self.temporal_span <= 0 {
            return 0.0;
        }
        self.total_years as f64 / self.temporal_span as f64 * 100.0
    }

    pub fn available_years_str(&self) -> String {
        join_years(&self.available_years)
    }

    pub fn temporal_gaps_str(&self) -> String {
        join_years(&self.temporal_gaps)
    }
}

fn join_years(years: &[i32]) -> String {
    years.iter().map(|y| y.to_string()).collect::<Vec<_>>().join(",")
}

/// Years accepted when no other window is configured
pub fn default_year_window() -> RangeInclusive<i32> {
    MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR
}

/// Canonicalize an available-years field into a [`TemporalInterval`].
///
/// Accepts a list of integers or digit strings, or a comma-separated string.
/// Anything else, including years outside [`default_year_window`], is skipped;
/// with no valid year left the degenerate interval is returned as a defaulted value.
pub fn parse_temporal_data(value: &Value) -> FieldResult<TemporalInterval> {
    canonical_temporal(&YearsValue::from(value))
}

pub fn canonical_temporal(value: &YearsValue) -> FieldResult<TemporalInterval> {
    canonical_temporal_in(value, &default_year_window())
}

/// Like [`canonical_temporal`], keeping only years inside `window`
pub fn canonical_temporal_in(value: &YearsValue, window: &RangeInclusive<i32>) -> FieldResult<TemporalInterval> {
    let years = canonical_years_in(value, window);
    match TemporalInterval::from_years(years) {
        Some(interval) => Ok(interval),
        None => {
            let reason = match value {
                YearsValue::Missing => DefaultReason::Missing,
                YearsValue::List(items) if items.is_empty() => DefaultReason::Missing,
                YearsValue::Text(text) if text.trim().is_empty() => DefaultReason::Missing,
                _ => DefaultReason::Unparseable,
            };
            defaulted(FieldKind::AvailableYears, TemporalInterval::degenerate(), reason)
        }
    }
}

/// Sorted distinct years readable from a field
pub fn canonical_years(value: &YearsValue) -> Vec<i32> {
    canonical_years_in(value, &default_year_window())
}

pub fn canonical_years_in(value: &YearsValue, window: &RangeInclusive<i32>) -> Vec<i32> {
    let years: BTreeSet<i32> = match value {
        YearsValue::Missing | YearsValue::Unrecognized(_) => BTreeSet::new(),
        YearsValue::Text(text) => text.split(',').filter_map(digit_year).collect(),
        YearsValue::List(items) => items.iter().filter_map(year_token).collect(),
    };
    years.into_iter().filter(|year| window.contains(year)).collect()
}

fn year_token(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => digit_year(s),
        _ => None,
    }
}

fn digit_year(token: &str) -> Option<i32> {
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
