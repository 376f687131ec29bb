//! Schema validation with detailed error reporting

use indexmap::IndexMap;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use serde_json::{Map, Value};

use crate::core::record::IstvonRecord;
use crate::schema::registry::{SchemaLoadError, SchemaRegistry};

/// Advisory suggestions keyed by record field, in field order
pub type Suggestions = IndexMap<String, Vec<String>>;

/// Verbs that mark instructions as actionable
const ACTION_VERBS: [&str; 4] = ["create", "write", "analyze", "generate"];

/// Instructions shorter than this many words get a "more detail" advisory
const MIN_INSTRUCTION_WORDS: usize = 5;

/// Result of validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn from_issues(issues: Vec<ValidationIssue>, render: impl Fn(&ValidationIssue) -> String) -> Self {
        Self {
            valid: issues.is_empty(),
            errors: issues.iter().map(render).collect(),
            issues,
        }
    }

    /// First error message, if any
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Dotted path of the offending value (empty for the record root)
    pub path: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Schema validator with compiled schemas
pub struct Validator {
    /// The whole-record schema
    compiled: JsonValidator,
    /// One compiled fragment per top-level field
    fields: IndexMap<String, JsonValidator>,
    required: Vec<String>,
}

impl Validator {
    /// Create a new validator with the schema from the registry
    pub fn new(registry: &SchemaRegistry) -> Result<Self, SchemaLoadError> {
        let compile_error = |e: JsonSchemaError<'static>| SchemaLoadError::Compile {
            name: registry.name().to_string(),
            message: e.to_string(),
        };

        let compiled = validator_for(registry.schema()).map_err(compile_error)?;

        let mut fields = IndexMap::new();
        if let Some(props) = registry.properties() {
            for (name, fragment) in props {
                fields.insert(name.clone(), validator_for(fragment).map_err(compile_error)?);
            }
        }

        Ok(Self {
            compiled,
            fields,
            required: registry.required_fields().into_iter().map(String::from).collect(),
        })
    }

    /// Validate a complete record, stopping at the first failing constraint
    pub fn validate(&self, record: &IstvonRecord) -> ValidationResult {
        match record.to_value() {
            Ok(value) => self.validate_value(&value),
            Err(e) => ValidationResult::from_issues(
                vec![ValidationIssue {
                    path: String::new(),
                    message: format!("Unexpected validation error: {}", e),
                    suggestion: None,
                }],
                |issue| issue.message.clone(),
            ),
        }
    }

    /// Validate an untyped value against the whole schema
    pub fn validate_value(&self, value: &Value) -> ValidationResult {
        let result = match self.compiled.validate(value) {
            Ok(()) => ValidationResult::success(),
            Err(error) => ValidationResult::from_issues(vec![error_to_issue(&error, None)], |issue| {
                format!("Validation error at {}: {}", issue.path, issue.message)
            }),
        };
        tracing::debug!(valid = result.valid, "validated record");
        result
    }

    /// Validate a partial record field by field.
    ///
    /// With `required_only`, absent required keys are reported. Every present
    /// key the schema knows is checked and all of its errors are collected.
    pub fn validate_partial(&self, partial: &Map<String, Value>, required_only: bool) -> ValidationResult {
        let mut issues = Vec::new();

        if required_only {
            for field in &self.required {
                if !partial.contains_key(field) {
                    issues.push(ValidationIssue {
                        path: field.clone(),
                        message: format!("Missing required field: {}", field),
                        suggestion: Some(format!("Add the '{}' field", field)),
                    });
                }
            }
        }

        for (field, value) in partial {
            if let Some(fragment) = self.fields.get(field) {
                issues.extend(fragment.iter_errors(value).map(|e| error_to_issue(&e, Some(field))));
            }
        }

        ValidationResult::from_issues(issues, |issue| {
            if issue.message.starts_with("Missing required field") {
                issue.message.clone()
            } else {
                let field = issue.path.split('.').next().unwrap_or_default();
                format!("Field '{}': {}", field, issue.message)
            }
        })
    }

    /// Minimal valid record around the given instructions
    pub fn create_minimal(&self, instructions: &str) -> IstvonRecord {
        IstvonRecord::minimal(instructions)
    }

    /// Non-blocking advice for improving a record
    pub fn suggestions(&self, record: &Value) -> Suggestions {
        let mut suggestions = Suggestions::new();

        let instructions = record.get("instructions").and_then(Value::as_str).unwrap_or("");
        if !instructions.is_empty() {
            let mut advice = Vec::new();
            if instructions.split_whitespace().count() < MIN_INSTRUCTION_WORDS {
                advice.push("Consider making instructions more detailed".to_string());
            }
            let lower = instructions.to_lowercase();
            if !ACTION_VERBS.iter().any(|verb| lower.contains(verb)) {
                advice.push("Start with a clear action verb (create, write, analyze, etc.)".to_string());
            }
            if !advice.is_empty() {
                suggestions.insert("instructions".to_string(), advice);
            }
        }

        let has_sources = record
            .get("source_data")
            .and_then(Value::as_array)
            .is_some_and(|sources| !sources.is_empty());
        if !has_sources {
            suggestions.insert(
                "source_data".to_string(),
                vec!["Consider specifying data sources for better context".to_string()],
            );
        }

        let variables = record.get("variables").and_then(Value::as_object);
        let has_var = |key: &str| variables.is_some_and(|v| v.contains_key(key));
        let mut advice = Vec::new();
        if !has_var("topic") {
            advice.push("Adding a topic would improve clarity".to_string());
        }
        if !has_var("target_audience") {
            advice.push("Specifying target audience helps tailor content".to_string());
        }
        if !advice.is_empty() {
            suggestions.insert("variables".to_string(), advice);
        }

        suggestions
    }

    /// Names of the required top-level fields
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }
}

/// Convert a JSON Schema validation error to our issue format.
///
/// `field` prefixes the path when the error came from a field fragment.
fn error_to_issue(error: &JsonSchemaError, field: Option<&str>) -> ValidationIssue {
    let relative = pointer_to_dotted(error.instance_path.as_str());
    let path = match (field, relative.is_empty()) {
        (Some(f), true) => f.to_string(),
        (Some(f), false) => format!("{}.{}", f, relative),
        (None, _) => relative,
    };

    ValidationIssue {
        path,
        message: error.to_string(),
        suggestion: generate_help_message(error),
    }
}

/// Turn a JSON pointer (`/source_data/0/type`) into a dotted path
fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Format enum options as a string
fn format_enum_options(options: &Value) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            Some(format!("Expected value of type: {:?}", kind))
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(&SchemaRegistry::load().unwrap()).unwrap()
    }

    fn minimal_map() -> Map<String, Value> {
        IstvonRecord::minimal("Write a report").to_map().unwrap()
    }

    #[test]
    fn test_minimal_record_is_valid() {
        let v = validator();
        let result = v.validate(&v.create_minimal(""));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.first_error().is_none());
    }

    #[test]
    fn test_invalid_enum_reports_dotted_path() {
        let v = validator();
        let mut record = v.create_minimal("Write");
        record.variables.set("tone", "sarcastic");
        let result = v.validate(&record);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let error = result.first_error().unwrap();
        assert!(
            error.starts_with("Validation error at variables.tone: "),
            "unexpected error: {}",
            error
        );
        assert!(result.issues[0].suggestion.as_deref().unwrap().contains("professional"));
    }

    #[test]
    fn test_nested_array_path() {
        let v = validator();
        let mut record = v.create_minimal("Write");
        record.source_data[0].kind = "carrier_pigeon".to_string();
        let result = v.validate(&record);
        assert!(result.first_error().unwrap().starts_with("Validation error at source_data.0.type: "));
    }

    #[test]
    fn test_missing_top_level_key() {
        let v = validator();
        let mut map = minimal_map();
        map.remove("notification");
        let result = v.validate_value(&Value::Object(map));
        assert!(!result.valid);
        assert!(result.first_error().unwrap().contains("notification"));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let v = validator();
        let mut map = minimal_map();
        map.insert("extra".to_string(), json!(1));
        assert!(!v.validate_value(&Value::Object(map)).valid);
    }

    #[test]
    fn test_unknown_variable_allowed() {
        let v = validator();
        let mut record = v.create_minimal("Write");
        record.variables.set("mood", "cheerful");
        assert!(v.validate(&record).valid);
    }

    #[test]
    fn test_partial_missing_tools() {
        let v = validator();
        let mut map = minimal_map();
        map.remove("tools");
        let result = v.validate_partial(&map, true);
        assert!(!result.valid);
        assert_eq!(result.errors, ["Missing required field: tools"]);
    }

    #[test]
    fn test_partial_without_required_check_ignores_missing() {
        let v = validator();
        let mut map = Map::new();
        map.insert("instructions".to_string(), json!("Write"));
        let result = v.validate_partial(&map, false);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_partial_collects_all_field_errors() {
        let v = validator();
        let mut map = Map::new();
        map.insert("variables".to_string(), json!({"tone": "grumpy", "priority": "someday"}));
        map.insert("outcome".to_string(), json!({"format": "scroll", "delivery": "display"}));
        map.insert("unknown".to_string(), json!("ignored"));
        let result = v.validate_partial(&map, false);
        assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
        assert!(result.errors.iter().any(|e| e.starts_with("Field 'outcome': ")));
        assert_eq!(
            result.errors.iter().filter(|e| e.starts_with("Field 'variables': ")).count(),
            2
        );
        assert!(result.issues.iter().any(|i| i.path == "variables.tone"));
    }

    #[test]
    fn test_partial_required_and_field_errors_combined() {
        let v = validator();
        let mut map = Map::new();
        map.insert("instructions".to_string(), json!(42));
        let result = v.validate_partial(&map, true);
        assert_eq!(result.errors.len(), 6);
        assert!(result.errors.iter().any(|e| e.starts_with("Field 'instructions': ")));
    }

    #[test]
    fn test_pointer_to_dotted() {
        assert_eq!(pointer_to_dotted(""), "");
        assert_eq!(pointer_to_dotted("/tools/1/name"), "tools.1.name");
        assert_eq!(pointer_to_dotted("/variables/a~1b"), "variables.a/b");
    }

    #[test]
    fn test_suggestions_for_sparse_record() {
        let v = validator();
        let suggestions = v.suggestions(&json!({
            "instructions": "Do it",
            "source_data": [],
            "variables": {}
        }));
        assert_eq!(
            suggestions["instructions"],
            [
                "Consider making instructions more detailed",
                "Start with a clear action verb (create, write, analyze, etc.)"
            ]
        );
        assert_eq!(suggestions["source_data"].len(), 1);
        assert_eq!(suggestions["variables"].len(), 2);
        let order: Vec<&String> = suggestions.keys().collect();
        assert_eq!(order, ["instructions", "source_data", "variables"]);
    }

    #[test]
    fn test_no_suggestions_for_complete_record() {
        let v = validator();
        let suggestions = v.suggestions(&json!({
            "instructions": "Write a detailed report on sales",
            "source_data": [{"type": "file", "source": "sales.csv"}],
            "variables": {"topic": "sales", "target_audience": "executives"}
        }));
        assert!(suggestions.is_empty(), "{:?}", suggestions);
    }

    #[test]
    fn test_empty_instructions_get_no_instruction_advice() {
        let v = validator();
        let suggestions = v.suggestions(&json!({"instructions": ""}));
        assert!(!suggestions.contains_key("instructions"));
        assert!(suggestions.contains_key("source_data"));
        assert!(suggestions.contains_key("variables"));
    }

    #[test]
    fn test_suggestions_do_not_affect_validity() {
        let v = validator();
        let record = v.create_minimal("hi");
        assert!(!v.suggestions(&record.to_value().unwrap()).is_empty());
        assert!(v.validate(&record).valid);
    }
}
