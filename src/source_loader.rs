//! Reading initiative metadata from JSON-with-comments files.
//!
//! This sits outside the normalization core: it only turns a file into a
//! [`RawInitiativeMap`].

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, error};

use crate::domain::RawInitiativeMap;
use crate::error::{CatalogError, Result};
use crate::observability::metrics;

/// Remove `//` line comments and `/* */` block comments, leaving string literals intact.
///
/// Newlines inside comments are kept so error positions still match the source.
pub fn strip_json_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Parse JSONC text into a raw initiative map
pub fn parse_initiatives(content: &str) -> Result<RawInitiativeMap> {
    match serde_json::from_str::<Value>(&strip_json_comments(content))? {
        Value::Object(map) => Ok(map),
        other => Err(CatalogError::InvalidInput {
            message: format!("expected a JSON object keyed by initiative name, found {}", json_kind(&other)),
        }),
    }
}

/// Load a JSONC metadata file into a raw initiative map
pub fn load_initiatives<P: AsRef<Path>>(path: P) -> Result<RawInitiativeMap> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        metrics::source::load_error("io");
        error!("Failed to read metadata file {}: {}", path.display(), e);
        e
    })?;

    let initiatives = parse_initiatives(&content).map_err(|e| {
        metrics::source::load_error("parse");
        error!("Failed to parse metadata file {}: {}", path.display(), e);
        e
    })?;

    metrics::source::load_success(content.len());
    debug!("Loaded {} initiatives from {}", initiatives.len(), path.display());
    Ok(initiatives)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_strips_line_and_block_comments() {
        let input = "{\n  // heading\n  \"a\": 1, /* inline */ \"b\": 2\n}";
        let value: Value = serde_json::from_str(&strip_json_comments(input)).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_keeps_comment_markers_inside_strings() {
        let input = r#"{"url": "https://example.org/*x*/", "note": "say \"//hi\""}"#;
        assert_eq!(strip_json_comments(input), input);
    }

    #[test]
    fn test_multiline_block_keeps_line_count() {
        let input = "{\n/* one\ntwo\n*/\n\"a\": 1}";
        let stripped = strip_json_comments(input);
        assert_eq!(stripped.lines().count(), input.lines().count());
    }

    #[test]
    fn test_parse_preserves_authoring_order() {
        let map = parse_initiatives("{\"Zeta\": {}, // z\n \"Alpha\": {}}").unwrap();
        let names: Vec<&String> = map.keys().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        assert!(matches!(
            parse_initiatives("[1, 2]"),
            Err(CatalogError::InvalidInput { .. })
        ));
        assert!(matches!(parse_initiatives("{oops"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "// initiatives\n{{\"MapBiomas Brasil\": {{\"available_years\": [2020]}}}}").unwrap();

        let map = load_initiatives(file.path()).unwrap();
        assert!(map.contains_key("MapBiomas Brasil"));
        assert!(matches!(load_initiatives("/nonexistent.jsonc"), Err(CatalogError::Io(_))));
    }
}
