use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{defaulted, numeric_text, DefaultReason, FieldKind, FieldResult};
use crate::constants::DEFAULT_RESOLUTION_M;
use crate::domain::{ResolutionItem, ResolutionValue};

/// Canonicalize a spatial resolution field to a positive number of meters.
///
/// For versioned lists the entry flagged `current` wins, then the first entry,
/// then the first bare number in the list.
pub fn parse_resolution(value: &Value) -> FieldResult<f64> {
    canonical_resolution(&ResolutionValue::from(value))
}

pub fn canonical_resolution(value: &ResolutionValue) -> FieldResult<f64> {
    match value {
        ResolutionValue::Missing => missing(DefaultReason::Missing),
        ResolutionValue::Number(n) => positive(*n),
        ResolutionValue::Text(text) => {
            if text.trim().is_empty() {
                return missing(DefaultReason::Missing);
            }
            match numeric_text(text) {
                Some(parsed) => positive(parsed),
                None => missing(DefaultReason::Unparseable),
            }
        }
        ResolutionValue::Versions(items) => {
            if let Some(current) = current_version(items) {
                return canonical_resolution(current);
            }
            if let Some(ResolutionItem::Version { resolution, .. }) = items.first() {
                return canonical_resolution(resolution);
            }
            let bare = items.iter().find_map(|item| match item {
                ResolutionItem::Number(n) => Some(*n),
                _ => None,
            });
            match bare {
                Some(n) => positive(n),
                None if items.is_empty() => missing(DefaultReason::Missing),
                None => missing(DefaultReason::Unparseable),
            }
        }
        ResolutionValue::Unrecognized(_) => missing(DefaultReason::Unparseable),
    }
}

fn current_version(items: &[ResolutionItem]) -> Option<&ResolutionValue> {
    items.iter().find_map(|item| match item {
        ResolutionItem::Version { resolution, current: true } => Some(resolution.as_ref()),
        _ => None,
    })
}

fn positive(meters: f64) -> FieldResult<f64> {
    if meters.is_finite() && meters > 0.0 {
        Ok(meters)
    } else {
        missing(DefaultReason::OutOfRange)
    }
}

fn missing(reason: DefaultReason) -> FieldResult<f64> {
    defaulted(FieldKind::Resolution, DEFAULT_RESOLUTION_M, reason)
}

/// Primary resolution plus the range spanned by every listed version
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRange {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Collect every readable resolution of a field.
///
/// A `current` version narrows the range to that version alone.
pub fn resolution_range(value: &Value) -> ResolutionRange {
    let decoded = ResolutionValue::from(value);
    let values: Vec<f64> = match &decoded {
        ResolutionValue::Versions(items) => match current_version(items) {
            Some(current) => canonical_resolution(current).ok().into_iter().collect(),
            None => items
                .iter()
                .filter_map(|item| match item {
                    ResolutionItem::Version { resolution, .. } => canonical_resolution(resolution).ok(),
                    ResolutionItem::Number(n) => positive(*n).ok(),
                    ResolutionItem::Other(_) => None,
                })
                .collect(),
        },
        other => canonical_resolution(other).ok().into_iter().collect(),
    };

    match values.first() {
        Some(first) => ResolutionRange {
            value: *first,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        },
        None => ResolutionRange {
            value: DEFAULT_RESOLUTION_M,
            min: DEFAULT_RESOLUTION_M,
            max: DEFAULT_RESOLUTION_M,
        },
    }
}
