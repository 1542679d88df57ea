use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{defaulted, numeric_text, DefaultReason, FieldKind, FieldResult, FieldResultExt};
use crate::constants::{ACCURACY_PLACEHOLDERS, DEFAULT_ACCURACY};
use crate::domain::AccuracyValue;

/// Canonicalize an accuracy field to a percentage.
///
/// Values above 100 are passed through unchanged; the validator reports them.
pub fn parse_accuracy(value: &Value) -> FieldResult<f64> {
    canonical_accuracy(&AccuracyValue::from(value))
}

pub fn canonical_accuracy(value: &AccuracyValue) -> FieldResult<f64> {
    match value {
        AccuracyValue::Missing => missing(DefaultReason::Missing),
        AccuracyValue::NotAvailable => missing(DefaultReason::NotAvailable),
        AccuracyValue::Structured(structured) => canonical_accuracy(&structured.overall),
        AccuracyValue::Number(n) => {
            if n.is_finite() && *n >= 0.0 {
                Ok(*n)
            } else {
                missing(DefaultReason::OutOfRange)
            }
        }
        AccuracyValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return missing(DefaultReason::Missing);
            }
            if ACCURACY_PLACEHOLDERS.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
                return missing(DefaultReason::Placeholder);
            }
            match numeric_text(trimmed) {
                Some(parsed) if parsed.is_finite() => Ok(parsed),
                Some(_) => missing(DefaultReason::OutOfRange),
                None => missing(DefaultReason::Unparseable),
            }
        }
        AccuracyValue::Unrecognized(_) => missing(DefaultReason::Unparseable),
    }
}

fn missing(reason: DefaultReason) -> FieldResult<f64> {
    defaulted(FieldKind::Accuracy, DEFAULT_ACCURACY, reason)
}

/// Accuracy with whatever breakdowns the structured schema provides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyDetails {
    pub overall: f64,
    /// "available", "not_available" or the record's own status text
    pub status: String,
    pub has_multiple: bool,
    pub by_collection: Vec<Value>,
    pub by_class: Vec<Value>,
    pub by_product: Vec<Value>,
}

pub fn accuracy_details(value: &Value) -> AccuracyDetails {
    let decoded = AccuracyValue::from(value);
    let overall = canonical_accuracy(&decoded).into_value();

    match decoded {
        AccuracyValue::NotAvailable => AccuracyDetails {
            overall,
            status: "not_available".to_string(),
            has_multiple: false,
            by_collection: Vec::new(),
            by_class: Vec::new(),
            by_product: Vec::new(),
        },
        AccuracyValue::Structured(structured) => {
            let has_multiple = !(structured.by_collection.is_empty()
                && structured.by_class.is_empty()
                && structured.by_product.is_empty());
            AccuracyDetails {
                overall,
                status: structured.status.unwrap_or_else(|| "available".to_string()),
                has_multiple,
                by_collection: structured.by_collection,
                by_class: structured.by_class,
                by_product: structured.by_product,
            }
        }
        _ => AccuracyDetails {
            overall,
            status: "available".to_string(),
            has_multiple: false,
            by_collection: Vec::new(),
            by_class: Vec::new(),
            by_product: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_plain_numbers() {
        assert_eq!(parse_accuracy(&json!(85)), Ok(85.0));
        assert_eq!(parse_accuracy(&json!(91.7)), Ok(91.7));
    }

    #[test]
    fn test_zero_is_a_real_value() {
        let result = parse_accuracy(&json!(0));
        assert!(!result.is_defaulted());
        assert_eq!(result.into_value(), 0.0);
    }

    #[test]
    fn test_not_available_status_defaults_to_zero() {
        let result = parse_accuracy(&json!({"status": "not_available"}));
        assert_eq!(result.default_reason(), Some(DefaultReason::NotAvailable));
        assert_eq!(result.into_value(), 0.0);
    }

    #[test]
    fn test_structured_overall_is_used() {
        let value = json!({"overall": "80.3%", "by_product": [{"product": "a", "accuracy": 75}]});
        assert_eq!(parse_accuracy(&value), Ok(80.3));
    }

    #[test]
    fn test_overflowing_digit_text_is_out_of_range() {
        let result = parse_accuracy(&json!("9".repeat(400)));
        assert_eq!(result.default_reason(), Some(DefaultReason::OutOfRange));
        assert_eq!(result.into_value(), 0.0);
    }

    #[test]
    fn test_status_without_overall_is_missing() {
        let result = parse_accuracy(&json!({"status": "pending"}));
        assert_eq!(result.default_reason(), Some(DefaultReason::Missing));
    }

    #[test]
    fn test_legacy_strings() {
        assert_eq!(parse_accuracy(&json!("85.3%")), Ok(85.3));
        assert_eq!(
            parse_accuracy(&json!("Not informed")).default_reason(),
            Some(DefaultReason::Placeholder)
        );
        assert_eq!(
            parse_accuracy(&json!("n/a")).default_reason(),
            Some(DefaultReason::Placeholder)
        );
        assert_eq!(
            parse_accuracy(&json!("unknown")).default_reason(),
            Some(DefaultReason::Unparseable)
        );
        assert_eq!(parse_accuracy(&json!("")).default_reason(), Some(DefaultReason::Missing));
    }

    #[test]
    fn test_output_is_never_negative() {
        for value in [json!(-4.0), json!("-12%"), json!([1, 2]), json!(true), json!({"foo": 1})] {
            assert!(parse_accuracy(&value).into_value() >= 0.0);
        }
    }

    #[test]
    fn test_values_above_hundred_pass_through() {
        assert_eq!(parse_accuracy(&json!(150)), Ok(150.0));
    }

    #[test]
    fn test_canonicalizing_twice_is_stable() {
        for value in [json!("77.5%"), json!(92), json!({"overall": 64.2}), json!("N/A")] {
            let once = parse_accuracy(&value).into_value();
            let twice = parse_accuracy(&json!(once)).into_value();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_accuracy_details_exposes_breakdowns() {
        let details = accuracy_details(&json!({
            "overall": 88.0,
            "by_collection": [{"collection": 8, "accuracy": 88.0}]
        }));
        assert_eq!(details.overall, 88.0);
        assert_eq!(details.status, "available");
        assert!(details.has_multiple);
        assert_eq!(details.by_collection.len(), 1);

        let unavailable = accuracy_details(&json!({"status": "not_available"}));
        assert_eq!(unavailable.status, "not_available");
        assert_eq!(unavailable.overall, 0.0);
    }
}
