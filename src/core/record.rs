//! The ISTVON record: Instructions, Source data, Tools, Variables, Outcome, Notification
//!
//! Enumerated fields (tone, priority, format, delivery, method, trigger and the
//! source descriptor `type`) are plain strings here. The schema owns the
//! allowed value sets, so an out-of-set value is representable and gets
//! rejected by validation rather than by deserialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The six top-level keys, in canonical order
pub const TOP_LEVEL_KEYS: [&str; 6] = [
    "instructions",
    "source_data",
    "tools",
    "variables",
    "outcome",
    "notification",
];

/// Source descriptor type used by the placeholder entry
pub const PLACEHOLDER_SOURCE_TYPE: &str = "none";

/// A complete ISTVON structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IstvonRecord {
    pub instructions: String,
    pub source_data: Vec<SourceDescriptor>,
    pub tools: Vec<ToolDescriptor>,
    pub variables: Variables,
    pub outcome: Outcome,
    pub notification: Notification,
}

impl IstvonRecord {
    /// Minimal valid record around the given instructions
    pub fn minimal(instructions: impl Into<String>) -> Self {
        let mut variables = Variables::default();
        variables.set(Variables::TONE, "professional");
        variables.set(Variables::PRIORITY, "medium");

        Self {
            instructions: instructions.into(),
            source_data: vec![SourceDescriptor::new(PLACEHOLDER_SOURCE_TYPE, "general_knowledge")],
            tools: vec![ToolDescriptor::new("text_generation")],
            variables,
            outcome: Outcome::new("plain_text", "display"),
            notification: Notification::new("none"),
        }
    }

    /// True when `source_data` is exactly the single `none` placeholder
    pub fn has_placeholder_source(&self) -> bool {
        self.source_data.len() == 1 && self.source_data[0].kind == PLACEHOLDER_SOURCE_TYPE
    }

    /// Convert to an untyped JSON value
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Convert to a JSON object map (for partial validation)
    pub fn to_map(&self) -> serde_json::Result<Map<String, Value>> {
        match self.to_value()? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Names of all tools, in order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// One entry of `source_data`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl SourceDescriptor {
    pub fn new(kind: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
            description: None,
            required: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// One entry of `tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            parameters: None,
        }
    }
}

/// Free-form variables with typed accessors for the recognized keys.
///
/// Keys keep insertion order so extraction order is what gets serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(IndexMap<String, Value>);

impl Variables {
    pub const TOPIC: &'static str = "topic";
    pub const TONE: &'static str = "tone";
    pub const LENGTH: &'static str = "length";
    pub const TARGET_AUDIENCE: &'static str = "target_audience";
    pub const PRIORITY: &'static str = "priority";
    pub const LANGUAGE: &'static str = "language";

    /// Insert or overwrite one variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge many variables; keys not mentioned are left alone
    pub fn merge<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn topic(&self) -> Option<&str> {
        self.get_str(Self::TOPIC)
    }

    pub fn tone(&self) -> Option<&str> {
        self.get_str(Self::TONE)
    }

    pub fn length(&self) -> Option<&str> {
        self.get_str(Self::LENGTH)
    }

    pub fn target_audience(&self) -> Option<&str> {
        self.get_str(Self::TARGET_AUDIENCE)
    }

    pub fn priority(&self) -> Option<&str> {
        self.get_str(Self::PRIORITY)
    }

    pub fn language(&self) -> Option<&str> {
        self.get_str(Self::LANGUAGE)
    }
}

/// Output format and delivery, plus any extra delivery options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub format: String,
    pub delivery: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Outcome {
    pub fn new(format: impl Into<String>, delivery: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            delivery: delivery.into(),
            filename: None,
            destination: None,
            extra: IndexMap::new(),
        }
    }

    /// Set the output filename; empty strings are ignored
    pub fn with_filename(mut self, filename: &str) -> Self {
        if !filename.is_empty() {
            self.filename = Some(filename.to_string());
        }
        self
    }

    /// Set the delivery destination; empty strings are ignored
    pub fn with_destination(mut self, destination: &str) -> Self {
        if !destination.is_empty() {
            self.destination = Some(destination.to_string());
        }
        self
    }

    /// Add an extra option. Named fields are overwritten when given a string
    /// value; a non-string value for a named field is dropped.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match (key.as_str(), value) {
            ("format", Value::String(s)) => self.format = s,
            ("delivery", Value::String(s)) => self.delivery = s,
            ("filename", Value::String(s)) => self.filename = Some(s),
            ("destination", Value::String(s)) => self.destination = Some(s),
            ("format" | "delivery" | "filename" | "destination", other) => {
                tracing::warn!(key = %key, value = %other, "ignoring non-string outcome field");
            }
            (_, value) => {
                self.extra.insert(key, value);
            }
        }
        self
    }
}

/// Notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub method: String,
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_template: Option<String>,
}

impl Notification {
    /// Default trigger for a new notification
    pub const DEFAULT_TRIGGER: &'static str = "on_completion";

    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            trigger: Self::DEFAULT_TRIGGER.to_string(),
            recipient: None,
            message_template: None,
        }
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    /// Set the recipient; empty strings are ignored
    pub fn with_recipient(mut self, recipient: &str) -> Self {
        if !recipient.is_empty() {
            self.recipient = Some(recipient.to_string());
        }
        self
    }

    /// Set the message template; empty strings are ignored
    pub fn with_message_template(mut self, template: &str) -> Self {
        if !template.is_empty() {
            self.message_template = Some(template.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_record_shape() {
        let record = IstvonRecord::minimal("Do it");
        let value = record.to_value().unwrap();
        assert_eq!(
            value,
            json!({
                "instructions": "Do it",
                "source_data": [{"type": "none", "source": "general_knowledge"}],
                "tools": [{"name": "text_generation"}],
                "variables": {"tone": "professional", "priority": "medium"},
                "outcome": {"format": "plain_text", "delivery": "display"},
                "notification": {"method": "none", "trigger": "on_completion"}
            })
        );
        assert!(record.has_placeholder_source());
    }

    #[test]
    fn test_source_descriptor_type_rename() {
        let src = SourceDescriptor::new("file", "data.csv").with_required(true);
        let value = serde_json::to_value(&src).unwrap();
        assert_eq!(value, json!({"type": "file", "source": "data.csv", "required": true}));
    }

    #[test]
    fn test_variables_keep_insertion_order() {
        let mut vars = Variables::default();
        vars.set("topic", "rust");
        vars.set("tone", "casual");
        vars.set("custom", 3);
        let keys: Vec<&String> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["topic", "tone", "custom"]);
        assert_eq!(vars.topic(), Some("rust"));
        assert!(vars.get_str("custom").is_none());
    }

    #[test]
    fn test_outcome_extra_options_flatten() {
        let outcome = Outcome::new("pdf", "save_to_file")
            .with_filename("out.pdf")
            .with_option("compress", true);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({"format": "pdf", "delivery": "save_to_file", "filename": "out.pdf", "compress": true})
        );

        let back: Outcome = serde_json::from_value(value).unwrap();
        assert_eq!(back.extra.get("compress"), Some(&json!(true)));
    }

    #[test]
    fn test_outcome_option_overrides_named_field() {
        let outcome = Outcome::new("pdf", "display").with_option("format", "html");
        assert_eq!(outcome.format, "html");
        assert!(outcome.extra.is_empty());
    }

    #[test]
    fn test_empty_optional_strings_ignored() {
        let outcome = Outcome::new("pdf", "display").with_filename("").with_destination("");
        assert!(outcome.filename.is_none());
        assert!(outcome.destination.is_none());

        let notification = Notification::new("email").with_recipient("").with_message_template("");
        assert!(notification.recipient.is_none());
        assert!(notification.message_template.is_none());
        assert_eq!(notification.trigger, "on_completion");
    }

    #[test]
    fn test_record_requires_all_six_keys() {
        let partial = json!({"instructions": "x"});
        assert!(serde_json::from_value::<IstvonRecord>(partial).is_err());
    }
}
