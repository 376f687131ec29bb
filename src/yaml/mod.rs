//! Reading ISTVON records from JSON or YAML text

pub mod diagnostics;

pub use diagnostics::MalformedInputError;

use serde_json::{Map, Value};
use std::path::Path;

use crate::core::record::IstvonRecord;

/// File extensions accepted as record input
pub const INPUT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// True when the path has a record input extension
pub fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

/// Parse text into an untyped value. `.json` names use the JSON parser,
/// anything else is read as YAML.
pub fn parse_value(source: &str, filename: &str) -> Result<Value, MalformedInputError> {
    if filename.to_lowercase().ends_with(".json") {
        serde_json::from_str(source).map_err(|e| MalformedInputError::from_json_error(&e, source, filename))
    } else {
        serde_yml::from_str(source).map_err(|e| MalformedInputError::from_yaml_error(&e, source, filename))
    }
}

/// Parse text into a top-level mapping, as used for partial validation
pub fn parse_partial(source: &str, filename: &str) -> Result<Map<String, Value>, MalformedInputError> {
    match parse_value(source, filename)? {
        Value::Object(map) => Ok(map),
        other => Err(MalformedInputError::at_location(
            format!("expected a mapping at the top level, found {}", kind_name(&other)),
            source,
            filename,
            1,
            1,
        )),
    }
}

/// Parse text into a complete record
pub fn parse_record(source: &str, filename: &str) -> Result<IstvonRecord, MalformedInputError> {
    let map = parse_partial(source, filename)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| MalformedInputError::at_location(e.to_string(), source, filename, 1, 1))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_RECORD: &str = r#"
instructions: Summarize the quarterly report
source_data:
  - type: file
    source: q3.pdf
tools:
  - name: summarization
variables:
  tone: formal
outcome:
  format: markdown
  delivery: display
notification:
  method: none
  trigger: on_completion
"#;

    #[test]
    fn test_parse_yaml_record() {
        let record = parse_record(YAML_RECORD, "q3.yaml").unwrap();
        assert_eq!(record.instructions, "Summarize the quarterly report");
        assert_eq!(record.source_data[0].kind, "file");
        assert_eq!(record.variables.tone(), Some("formal"));
    }

    #[test]
    fn test_parse_json_record() {
        let json = IstvonRecord::minimal("Write").to_json_pretty().unwrap();
        let record = parse_record(&json, "r.json").unwrap();
        assert_eq!(record, IstvonRecord::minimal("Write"));
    }

    #[test]
    fn test_partial_accepts_incomplete_mapping() {
        let map = parse_partial("instructions: hello\n", "p.yaml").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = parse_partial("- a\n- b\n", "list.yaml").unwrap_err();
        assert!(err.message().contains("a list"));
    }

    #[test]
    fn test_incomplete_record_rejected() {
        let err = parse_record("instructions: hello\n", "p.yaml").unwrap_err();
        assert!(err.message().contains("missing field"));
        assert!(err.help().is_some());
    }

    #[test]
    fn test_json_syntax_error() {
        assert!(parse_value("{\"a\": }", "bad.json").is_err());
    }

    #[test]
    fn test_is_record_file() {
        assert!(is_record_file(Path::new("a/b.yaml")));
        assert!(is_record_file(Path::new("b.JSON")));
        assert!(!is_record_file(Path::new("b.txt")));
        assert!(!is_record_file(Path::new("README")));
    }
}
