//! Typed views over heterogeneous initiative metadata.
//!
//! Initiative records are authored by hand in at least three shapes: a legacy form with
//! plain numbers, an intermediate form where numbers are written as strings ("30m", "85%"),
//! and a structured form where accuracy, resolution and reference system are nested
//! objects or versioned lists. Each field is decoded once into a sum type here; the
//! parsers in [`crate::pipeline::processing::parser`] pattern-match on those variants.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Initiative name to raw record, in authoring order.
pub type RawInitiativeMap = Map<String, Value>;

/// Schema generation a raw record was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// Plain scalar fields
    Legacy,
    /// Scalars written as free-form strings
    Intermediate,
    /// Nested objects and versioned lists
    Structured,
}

impl SchemaVersion {
    /// Detect the schema generation of a raw record.
    ///
    /// Any structured field marks the whole record as structured; otherwise any
    /// string-valued metric marks it as intermediate.
    pub fn detect(record: &Value) -> Self {
        let Some(obj) = record.as_object() else {
            return SchemaVersion::Legacy;
        };

        let accuracy = accuracy_field(obj);
        let resolution = obj.get("spatial_resolution");

        let structured = matches!(accuracy, Some(Value::Object(_)))
            || matches!(resolution, Some(Value::Array(_)))
            || matches!(obj.get("reference_system"), Some(Value::Array(_)))
            || matches!(obj.get("detailed_products"), Some(Value::Array(_)));
        if structured {
            return SchemaVersion::Structured;
        }

        if matches!(accuracy, Some(Value::String(_))) || matches!(resolution, Some(Value::String(_))) {
            return SchemaVersion::Intermediate;
        }

        SchemaVersion::Legacy
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::Legacy => "legacy",
            SchemaVersion::Intermediate => "intermediate",
            SchemaVersion::Structured => "structured",
        }
    }
}

/// Accuracy as found in a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum AccuracyValue {
    Missing,
    /// `{"status": "not_available"}`
    NotAvailable,
    Structured(StructuredAccuracy),
    Number(f64),
    /// Legacy free text such as "85.3%" or "Not informed"
    Text(String),
    Unrecognized(Value),
}

/// Structured accuracy object: an overall figure plus optional breakdowns
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredAccuracy {
    pub status: Option<String>,
    pub overall: Box<AccuracyValue>,
    pub by_collection: Vec<Value>,
    pub by_class: Vec<Value>,
    pub by_product: Vec<Value>,
}

impl From<&Value> for AccuracyValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AccuracyValue::Missing,
            Value::Number(n) => n
                .as_f64()
                .map(AccuracyValue::Number)
                .unwrap_or_else(|| AccuracyValue::Unrecognized(value.clone())),
            Value::String(s) => AccuracyValue::Text(s.clone()),
            Value::Object(obj) => {
                let status = obj.get("status").and_then(|v| v.as_str()).map(str::to_string);
                if status.as_deref() == Some("not_available") {
                    return AccuracyValue::NotAvailable;
                }
                if status.is_none() && !obj.contains_key("overall") {
                    return AccuracyValue::Unrecognized(value.clone());
                }
                let overall = obj
                    .get("overall")
                    .map(AccuracyValue::from)
                    .unwrap_or(AccuracyValue::Missing);
                AccuracyValue::Structured(StructuredAccuracy {
                    status,
                    overall: Box::new(overall),
                    by_collection: list_field(obj, "by_collection"),
                    by_class: list_field(obj, "by_class"),
                    by_product: list_field(obj, "by_product"),
                })
            }
            Value::Bool(_) | Value::Array(_) => AccuracyValue::Unrecognized(value.clone()),
        }
    }
}

/// Spatial resolution as found in a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionValue {
    Missing,
    Number(f64),
    /// Numeric text, possibly with units ("30m", "10 meters")
    Text(String),
    /// Versioned list, typically `[{"resolution": 10, "current": true}, ...]`
    Versions(Vec<ResolutionItem>),
    Unrecognized(Value),
}

/// One element of a versioned resolution list
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionItem {
    Version {
        resolution: Box<ResolutionValue>,
        current: bool,
    },
    Number(f64),
    Other(Value),
}

impl From<&Value> for ResolutionValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ResolutionValue::Missing,
            Value::Number(n) => n
                .as_f64()
                .map(ResolutionValue::Number)
                .unwrap_or_else(|| ResolutionValue::Unrecognized(value.clone())),
            Value::String(s) => ResolutionValue::Text(s.clone()),
            Value::Array(items) => ResolutionValue::Versions(items.iter().map(ResolutionItem::from).collect()),
            Value::Bool(_) | Value::Object(_) => ResolutionValue::Unrecognized(value.clone()),
        }
    }
}

impl From<&Value> for ResolutionItem {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(obj) => ResolutionItem::Version {
                resolution: Box::new(
                    obj.get("resolution")
                        .map(ResolutionValue::from)
                        .unwrap_or(ResolutionValue::Missing),
                ),
                current: obj.get("current").map(is_truthy).unwrap_or(false),
            },
            Value::Number(n) => match n.as_f64() {
                Some(f) => ResolutionItem::Number(f),
                None => ResolutionItem::Other(value.clone()),
            },
            other => ResolutionItem::Other(other.clone()),
        }
    }
}

/// Reference system as found in a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceSystemValue {
    Missing,
    Text(String),
    Systems(Vec<ReferenceSystemEntry>),
    Unrecognized(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSystemEntry {
    pub epsg_code: String,
    pub hemisphere: Option<String>,
}

impl From<&Value> for ReferenceSystemValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ReferenceSystemValue::Missing,
            Value::String(s) => ReferenceSystemValue::Text(s.clone()),
            Value::Array(items) => ReferenceSystemValue::Systems(
                items
                    .iter()
                    .filter_map(|item| item.as_object())
                    .filter_map(|obj| {
                        let epsg_code = scalar_text(obj.get("epsg_code")?)?;
                        if epsg_code.is_empty() {
                            return None;
                        }
                        let hemisphere = obj
                            .get("hemisphere")
                            .and_then(scalar_text)
                            .filter(|h| !h.is_empty());
                        Some(ReferenceSystemEntry { epsg_code, hemisphere })
                    })
                    .collect(),
            ),
            other => ReferenceSystemValue::Unrecognized(other.clone()),
        }
    }
}

/// Available years as found in a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum YearsValue {
    Missing,
    /// `"2018, 2019, 2021"`
    Text(String),
    /// Integers and numeric strings, possibly mixed with junk
    List(Vec<Value>),
    Unrecognized(Value),
}

impl From<&Value> for YearsValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => YearsValue::Missing,
            Value::String(s) => YearsValue::Text(s.clone()),
            Value::Array(items) => YearsValue::List(items.clone()),
            other => YearsValue::Unrecognized(other.clone()),
        }
    }
}

impl From<&[i32]> for YearsValue {
    fn from(years: &[i32]) -> Self {
        YearsValue::List(years.iter().map(|y| Value::from(*y)).collect())
    }
}

/// Strongly-typed view of one raw initiative record.
///
/// Every field is optional; absent, null and wrongly-typed values all decode to the
/// `Missing`/`None`/`Unrecognized` variants so the builder never has to inspect JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInitiative {
    pub schema_version: SchemaVersion,
    pub acronym: Option<String>,
    pub coverage: Option<String>,
    pub provider: Option<String>,
    pub source: Option<String>,
    pub spatial_resolution: ResolutionValue,
    /// `overall_accuracy`, falling back to the legacy `accuracy` key
    pub accuracy: AccuracyValue,
    pub number_of_classes: Option<u32>,
    /// Class counts of each object in `detailed_products` (1 when a product omits it)
    pub detailed_products: Option<Vec<u32>>,
    pub classification_method: Option<String>,
    pub methodology: Option<String>,
    pub reference_system: ReferenceSystemValue,
    /// `available_years`, falling back to the legacy `anos_disponiveis` key
    pub available_years: YearsValue,
    pub temporal_frequency: Option<String>,
    pub update_frequency: Option<String>,
}

impl RawInitiative {
    pub fn from_json(record: &Value) -> Self {
        let empty = Map::new();
        let obj = record.as_object().unwrap_or(&empty);

        let text = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let detailed_products = obj.get("detailed_products").and_then(|v| v.as_array()).map(|products| {
            products
                .iter()
                .filter_map(|p| p.as_object())
                .map(|p| p.get("number_of_classes").and_then(class_count).unwrap_or(1))
                .collect()
        });

        Self {
            schema_version: SchemaVersion::detect(record),
            acronym: text("acronym").filter(|a| !a.trim().is_empty()),
            coverage: text("coverage"),
            provider: text("provider"),
            source: text("source"),
            spatial_resolution: obj
                .get("spatial_resolution")
                .map(ResolutionValue::from)
                .unwrap_or(ResolutionValue::Missing),
            accuracy: accuracy_field(obj)
                .map(AccuracyValue::from)
                .unwrap_or(AccuracyValue::Missing),
            number_of_classes: obj.get("number_of_classes").and_then(class_count),
            detailed_products,
            classification_method: text("classification_method"),
            methodology: text("methodology"),
            reference_system: obj
                .get("reference_system")
                .map(ReferenceSystemValue::from)
                .unwrap_or(ReferenceSystemValue::Missing),
            available_years: years_field(obj)
                .map(YearsValue::from)
                .unwrap_or(YearsValue::Missing),
            temporal_frequency: text("temporal_frequency"),
            update_frequency: text("update_frequency"),
        }
    }
}

/// The record's own available years, preferring `available_years` over `anos_disponiveis`.
pub fn years_field(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("available_years")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("anos_disponiveis"))
}

fn accuracy_field(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("overall_accuracy")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("accuracy"))
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<Value> {
    obj.get(key).and_then(|v| v.as_array()).cloned().unwrap_or_default()
}

fn class_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.trunc() as u32),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Truthiness the way hand-written metadata uses it: `true`, non-zero, non-empty.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detects_schema_versions() {
        assert_eq!(
            SchemaVersion::detect(&json!({"overall_accuracy": 85.0, "spatial_resolution": 30})),
            SchemaVersion::Legacy
        );
        assert_eq!(
            SchemaVersion::detect(&json!({"accuracy": "85%", "spatial_resolution": 30})),
            SchemaVersion::Intermediate
        );
        assert_eq!(
            SchemaVersion::detect(&json!({"spatial_resolution": [{"resolution": 10, "current": true}]})),
            SchemaVersion::Structured
        );
        assert_eq!(SchemaVersion::detect(&json!(null)), SchemaVersion::Legacy);
    }

    #[test]
    fn test_decodes_not_available_accuracy() {
        let value = AccuracyValue::from(&json!({"status": "not_available"}));
        assert_eq!(value, AccuracyValue::NotAvailable);
    }

    #[test]
    fn test_decodes_structured_accuracy_breakdowns() {
        let value = AccuracyValue::from(&json!({
            "overall": 82.5,
            "by_class": [{"class": "forest", "accuracy": 90}]
        }));
        match value {
            AccuracyValue::Structured(s) => {
                assert_eq!(*s.overall, AccuracyValue::Number(82.5));
                assert_eq!(s.by_class.len(), 1);
                assert!(s.by_product.is_empty());
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_raw_initiative_falls_back_to_legacy_keys() {
        let raw = RawInitiative::from_json(&json!({
            "accuracy": "Not informed",
            "anos_disponiveis": [2001, 2002]
        }));
        assert_eq!(raw.accuracy, AccuracyValue::Text("Not informed".to_string()));
        assert_eq!(raw.available_years, YearsValue::List(vec![json!(2001), json!(2002)]));
    }

    #[test]
    fn test_detailed_products_default_to_one_class() {
        let raw = RawInitiative::from_json(&json!({
            "detailed_products": [{"number_of_classes": 9}, {"name": "no classes"}, "junk"]
        }));
        assert_eq!(raw.detailed_products, Some(vec![9, 1]));
    }

    #[test]
    fn test_reference_entries_skip_missing_codes() {
        let value = ReferenceSystemValue::from(&json!([
            {"epsg_code": "32723", "hemisphere": "S"},
            {"hemisphere": "N"},
            {"epsg_code": 4326}
        ]));
        assert_eq!(
            value,
            ReferenceSystemValue::Systems(vec![
                ReferenceSystemEntry { epsg_code: "32723".into(), hemisphere: Some("S".into()) },
                ReferenceSystemEntry { epsg_code: "4326".into(), hemisphere: None },
            ])
        );
    }
}
