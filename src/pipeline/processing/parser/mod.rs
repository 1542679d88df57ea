//! Field parsers: one total canonicalization function per heterogeneous field.
//!
//! Every parser returns a [`FieldResult`]. `Ok` holds a value read from the input;
//! `Err` holds a [`DefaultedWarning`] carrying the documented fallback, so callers
//! can always obtain a canonical value while still telling a real zero from a
//! defaulted one.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod accuracy;
pub mod reference_system;
pub mod resolution;
pub mod temporal;

pub use accuracy::{accuracy_details, canonical_accuracy, parse_accuracy, AccuracyDetails};
pub use reference_system::{canonical_reference_system, parse_reference_system};
pub use resolution::{canonical_resolution, parse_resolution, resolution_range, ResolutionRange};
pub use temporal::{
    canonical_temporal, canonical_temporal_in, canonical_years, canonical_years_in, default_year_window,
    parse_temporal_data, TemporalInterval,
};

/// Field a defaulted value was produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Accuracy,
    Resolution,
    ReferenceSystem,
    AvailableYears,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Accuracy => "accuracy",
            FieldKind::Resolution => "resolution",
            FieldKind::ReferenceSystem => "reference_system",
            FieldKind::AvailableYears => "available_years",
        }
    }
}

/// Why a field fell back to its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// Absent, null or empty
    Missing,
    /// Explicitly flagged as unavailable by the record
    NotAvailable,
    /// A known placeholder string such as "Not informed"
    Placeholder,
    /// Present but not interpretable
    Unparseable,
    /// Parsed, but outside the domain of the field
    OutOfRange,
}

impl DefaultReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultReason::Missing => "missing",
            DefaultReason::NotAvailable => "not_available",
            DefaultReason::Placeholder => "placeholder",
            DefaultReason::Unparseable => "unparseable",
            DefaultReason::OutOfRange => "out_of_range",
        }
    }
}

/// A field that could not be read and was replaced by its fallback value
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultedWarning<T> {
    pub field: FieldKind,
    pub fallback: T,
    pub reason: DefaultReason,
}

impl<T: fmt::Debug> fmt::Display for DefaultedWarning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} defaulted to {:?} ({})",
            self.field.as_str(),
            self.fallback,
            self.reason.as_str()
        )
    }
}

impl<T: fmt::Debug> std::error::Error for DefaultedWarning<T> {}

pub type FieldResult<T> = Result<T, DefaultedWarning<T>>;

/// Accessors that keep the total-function guarantee on top of [`FieldResult`]
pub trait FieldResultExt<T> {
    /// The canonical value, whether read or defaulted
    fn into_value(self) -> T;
    fn is_defaulted(&self) -> bool;
    fn default_reason(&self) -> Option<DefaultReason>;
}

impl<T> FieldResultExt<T> for FieldResult<T> {
    fn into_value(self) -> T {
        match self {
            Ok(value) => value,
            Err(warning) => warning.fallback,
        }
    }

    fn is_defaulted(&self) -> bool {
        self.is_err()
    }

    fn default_reason(&self) -> Option<DefaultReason> {
        self.as_ref().err().map(|w| w.reason)
    }
}

pub(crate) fn defaulted<T>(field: FieldKind, fallback: T, reason: DefaultReason) -> FieldResult<T> {
    Err(DefaultedWarning { field, fallback, reason })
}

static NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.]").expect("valid pattern"));

/// Strip everything but digits and dots and parse what is left ("85.3%" -> 85.3).
pub(crate) fn numeric_text(text: &str) -> Option<f64> {
    let stripped = NON_NUMERIC.replace_all(text, "");
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_text_strips_units() {
        assert_eq!(numeric_text("30m"), Some(30.0));
        assert_eq!(numeric_text("85.3 %"), Some(85.3));
        assert_eq!(numeric_text("Not informed"), None);
        assert_eq!(numeric_text("1.2.3"), None);
    }

    #[test]
    fn test_field_result_ext() {
        let read: FieldResult<f64> = Ok(12.0);
        let fallback: FieldResult<f64> = defaulted(FieldKind::Accuracy, 0.0, DefaultReason::Missing);

        assert!(!read.is_defaulted());
        assert!(fallback.is_defaulted());
        assert_eq!(fallback.default_reason(), Some(DefaultReason::Missing));
        assert_eq!(read.into_value(), 12.0);
        assert_eq!(fallback.into_value(), 0.0);
    }

    #[test]
    fn test_warning_display() {
        let warning = DefaultedWarning {
            field: FieldKind::Resolution,
            fallback: 30.0,
            reason: DefaultReason::Unparseable,
        };
        assert_eq!(warning.to_string(), "resolution defaulted to 30.0 (unparseable)");
    }
}
