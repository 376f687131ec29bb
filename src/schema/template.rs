//! Predefined ISTVON templates
//!
//! Templates are bundled JSON files describing a categorized record. String
//! values may contain Tera expressions such as
//! `{{ topic | default(value="your topic") }}` that are filled in from
//! caller-supplied variables when the template is rendered.

use miette::Diagnostic;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::record::IstvonRecord;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(istvon::template::not_found), help("Run `istvon template list` to see available templates"))]
    NotFound(String),

    #[error("Template {name} is not valid JSON: {message}")]
    #[diagnostic(code(istvon::template::parse))]
    Parse { name: String, message: String },

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(istvon::template::render))]
    RenderError(String),

    #[error("Template {name} does not render to an ISTVON record: {message}")]
    #[diagnostic(code(istvon::template::shape))]
    Shape { name: String, message: String },
}

/// Template category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Content,
    Analysis,
    Coding,
    Communication,
    Research,
    Other,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Content => "content",
            TemplateCategory::Analysis => "analysis",
            TemplateCategory::Coding => "coding",
            TemplateCategory::Communication => "communication",
            TemplateCategory::Research => "research",
            TemplateCategory::Other => "other",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TemplateCategory::Content => "Content Creation",
            TemplateCategory::Analysis => "Data Analysis",
            TemplateCategory::Coding => "Code Generation",
            TemplateCategory::Communication => "Communication",
            TemplateCategory::Research => "Research",
            TemplateCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content" => Ok(TemplateCategory::Content),
            "analysis" => Ok(TemplateCategory::Analysis),
            "coding" => Ok(TemplateCategory::Coding),
            "communication" => Ok(TemplateCategory::Communication),
            "research" => Ok(TemplateCategory::Research),
            "other" => Ok(TemplateCategory::Other),
            _ => Err(format!("Unknown template category: {}", s)),
        }
    }
}

/// A bundled template: a record skeleton plus metadata
#[derive(Debug, Clone, Deserialize)]
pub struct IstvonTemplate {
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    /// Record skeleton; string leaves may hold Tera expressions
    pub record: Value,
}

/// All bundled templates, sorted by name
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<IstvonTemplate>,
}

impl TemplateLibrary {
    /// Load the embedded templates
    pub fn load() -> Result<Self, TemplateError> {
        let mut templates = Vec::new();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if !filename.ends_with(".json") {
                continue;
            }
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let template: IstvonTemplate =
                    serde_json::from_slice(&content.data).map_err(|e| TemplateError::Parse {
                        name: filename.to_string(),
                        message: e.to_string(),
                    })?;
                templates.push(template);
            }
        }

        Ok(Self::from_templates(templates))
    }

    pub fn from_templates(mut templates: Vec<IstvonTemplate>) -> Self {
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Self { templates }
    }

    /// Templates, optionally restricted to one category
    pub fn list(&self, category: Option<TemplateCategory>) -> Vec<&IstvonTemplate> {
        self.templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&IstvonTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Render a template with the given variables into a record
    pub fn render(&self, name: &str, vars: &BTreeMap<String, String>) -> Result<IstvonRecord, TemplateError> {
        let template = self.get(name).ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        let mut context = tera::Context::new();
        for (key, value) in vars {
            context.insert(key.as_str(), value);
        }

        let rendered = render_value(&template.record, &context)?;
        let record = serde_json::from_value(rendered).map_err(|e| TemplateError::Shape {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(template = name, "rendered template");
        Ok(record)
    }
}

/// Render every string leaf that contains a Tera expression
fn render_value(value: &Value, context: &tera::Context) -> Result<Value, TemplateError> {
    match value {
        Value::String(s) if s.contains("{{") || s.contains("{%") => tera::Tera::one_off(s, context, false)
            .map(Value::String)
            .map_err(|e| TemplateError::RenderError(format!("{:?}", e))),
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map {
                out.insert(key.clone(), render_value(item, context)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}
