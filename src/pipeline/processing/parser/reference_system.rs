use serde_json::Value;

use super::{defaulted, DefaultReason, FieldKind, FieldResult};
use crate::constants::DEFAULT_REFERENCE_SYSTEM;
use crate::domain::ReferenceSystemValue;

/// Canonicalize a reference system field to a display string.
///
/// Structured entries render as `code (hemisphere)` or `code`, joined with ", ".
/// Plain strings are returned unchanged.
pub fn parse_reference_system(value: &Value) -> FieldResult<String> {
    canonical_reference_system(&ReferenceSystemValue::from(value))
}

pub fn canonical_reference_system(value: &ReferenceSystemValue) -> FieldResult<String> {
    match value {
        ReferenceSystemValue::Missing => missing(DefaultReason::Missing),
        ReferenceSystemValue::Text(text) => Ok(text.clone()),
        ReferenceSystemValue::Systems(entries) if entries.is_empty() => missing(DefaultReason::Missing),
        ReferenceSystemValue::Systems(entries) => Ok(entries
            .iter()
            .map(|entry| match &entry.hemisphere {
                Some(hemisphere) => format!("{} ({})", entry.epsg_code, hemisphere),
                None => entry.epsg_code.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")),
        ReferenceSystemValue::Unrecognized(_) => missing(DefaultReason::Unparseable),
    }
}

fn missing(reason: DefaultReason) -> FieldResult<String> {
    defaulted(FieldKind::ReferenceSystem, DEFAULT_REFERENCE_SYSTEM.to_string(), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::parser::FieldResultExt;
    use serde_json::json;

    #[test]
    fn test_structured_entries_join_with_hemisphere() {
        let value = json!([
            {"epsg_code": "32723", "hemisphere": "S"},
            {"epsg_code": "32645"}
        ]);
        assert_eq!(parse_reference_system(&value), Ok("32723 (S), 32645".to_string()));
    }

    #[test]
    fn test_plain_string_unchanged() {
        assert_eq!(
            parse_reference_system(&json!("SIRGAS 2000 / EPSG:4674")),
            Ok("SIRGAS 2000 / EPSG:4674".to_string())
        );
    }

    #[test]
    fn test_empty_or_unknown_defaults() {
        for value in [json!([]), json!([{"hemisphere": "N"}]), json!(4326), json!(null)] {
            let result = parse_reference_system(&value);
            assert!(result.is_defaulted());
            assert_eq!(result.into_value(), "EPSG:4326");
        }
    }
}
