//! Schema registry - loads and caches the ISTVON JSON Schema

use miette::Diagnostic;
use once_cell::sync::OnceCell;
use rust_embed::Embed;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// File name of the bundled schema
pub const SCHEMA_FILE: &str = "istvon.schema.json";

static GLOBAL: OnceCell<SchemaRegistry> = OnceCell::new();

/// Schema could not be loaded
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaLoadError {
    #[error("Schema file not found at: {0}")]
    #[diagnostic(code(istvon::schema::not_found))]
    NotFound(String),

    #[error("Failed to read schema {path}: {source}")]
    #[diagnostic(code(istvon::schema::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in schema file {name}: {source}")]
    #[diagnostic(
        code(istvon::schema::malformed),
        help("The schema must be a JSON Schema document")
    )]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema {name} is not an object with top-level properties")]
    #[diagnostic(code(istvon::schema::shape))]
    Shape { name: String },

    #[error("Schema {name} failed to compile: {message}")]
    #[diagnostic(code(istvon::schema::compile))]
    Compile { name: String, message: String },
}

/// An immutable, parsed ISTVON schema
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    name: String,
    source: String,
    schema: Value,
}

impl SchemaRegistry {
    /// Load the bundled schema
    pub fn load() -> Result<Self, SchemaLoadError> {
        let file = EmbeddedSchemas::get(SCHEMA_FILE)
            .ok_or_else(|| SchemaLoadError::NotFound(format!("schemas/{}", SCHEMA_FILE)))?;
        let content = String::from_utf8_lossy(&file.data).into_owned();
        Self::from_source(SCHEMA_FILE, content)
    }

    /// Load a schema from a file on disk
    pub fn from_path(path: &Path) -> Result<Self, SchemaLoadError> {
        if !path.exists() {
            return Err(SchemaLoadError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&path.display().to_string(), content)
    }

    /// Parse schema text
    pub fn from_source(name: &str, content: String) -> Result<Self, SchemaLoadError> {
        let schema: Value =
            serde_json::from_str(&content).map_err(|source| SchemaLoadError::Malformed {
                name: name.to_string(),
                source,
            })?;

        if !schema.get("properties").is_some_and(Value::is_object) {
            return Err(SchemaLoadError::Shape {
                name: name.to_string(),
            });
        }

        tracing::debug!(schema = name, "loaded ISTVON schema");
        Ok(Self {
            name: name.to_string(),
            source: content,
            schema,
        })
    }

    /// The bundled schema, loaded on first use and cached for the process lifetime
    pub fn global() -> Result<&'static SchemaRegistry, SchemaLoadError> {
        GLOBAL.get_or_try_init(Self::load)
    }

    /// Name the schema was loaded under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw schema text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed schema document
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Top-level `properties` of the schema
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.schema.get("properties").and_then(Value::as_object)
    }

    /// Schema fragment for one top-level field
    pub fn field_schema(&self, field: &str) -> Option<&Value> {
        self.properties().and_then(|p| p.get(field))
    }

    /// Required top-level fields, in schema order
    pub fn required_fields(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Every enumerated field as `dotted.path -> allowed values`
    pub fn field_enums(&self) -> BTreeMap<String, Vec<String>> {
        let mut enums = BTreeMap::new();
        if let Some(props) = self.properties() {
            for (name, field) in props {
                collect_enums(field, name, &mut enums);
            }
        }
        enums
    }

    /// Allowed values for one dotted field path
    pub fn enum_values(&self, path: &str) -> Vec<String> {
        self.field_enums().remove(path).unwrap_or_default()
    }
}

fn collect_enums(node: &Value, path: &str, out: &mut BTreeMap<String, Vec<String>>) {
    let Some(obj) = node.as_object() else {
        return;
    };

    if let Some(values) = obj.get("enum").and_then(Value::as_array) {
        out.insert(
            path.to_string(),
            values
                .iter()
                .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                .collect(),
        );
    }

    if let Some(items) = obj.get("items") {
        collect_enums(items, path, out);
    }

    if let Some(props) = obj.get("properties").and_then(Value::as_object) {
        for (name, child) in props {
            collect_enums(child, &format!("{}.{}", path, name), out);
        }
    }
}
