//! Incremental record assembly
//!
//! `IstvonBuilder` starts from a minimal valid record and lets callers replace
//! or extend one section at a time. Nothing is checked until `build()` or
//! `build_partial()`.

use miette::Diagnostic;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::record::{IstvonRecord, Notification, Outcome, SourceDescriptor, ToolDescriptor};
use crate::schema::validator::Validator;

/// Builder output failed full validation
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("{message}")]
    #[diagnostic(
        code(istvon::builder::invalid_structure),
        help("Correct the reported field and build again")
    )]
    InvalidStructure { message: String },
}

/// Snapshot of the in-progress record with its partial validation verdict
#[derive(Debug, Clone, PartialEq)]
pub struct PartialBuild {
    pub record: IstvonRecord,
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Fluent builder over one in-progress record
pub struct IstvonBuilder<'v> {
    validator: &'v Validator,
    record: IstvonRecord,
}

impl<'v> IstvonBuilder<'v> {
    /// Start from the minimal record with empty instructions
    pub fn new(validator: &'v Validator) -> Self {
        Self::from_record(validator, validator.create_minimal(""))
    }

    /// Start from an existing record, e.g. a rendered template
    pub fn from_record(validator: &'v Validator, record: IstvonRecord) -> Self {
        Self { validator, record }
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) -> &mut Self {
        self.record.instructions = instructions.into();
        self
    }

    /// Append a data source. The default `none` placeholder is dropped first.
    pub fn add_source_data(&mut self, kind: &str, source: &str, description: &str, required: bool) -> &mut Self {
        if self.record.has_placeholder_source() {
            self.record.source_data.clear();
        }

        let mut descriptor = SourceDescriptor::new(kind, source).with_required(required);
        if !description.is_empty() {
            descriptor = descriptor.with_description(description);
        }
        self.record.source_data.push(descriptor);
        self
    }

    pub fn clear_tools(&mut self) -> &mut Self {
        self.record.tools.clear();
        self
    }

    /// Append a tool; `version` and `parameters` are kept only when non-empty
    pub fn add_tool(
        &mut self,
        name: &str,
        version: Option<&str>,
        parameters: Option<Map<String, Value>>,
    ) -> &mut Self {
        let mut tool = ToolDescriptor::new(name);
        tool.version = version.filter(|v| !v.is_empty()).map(String::from);
        tool.parameters = parameters.filter(|p| !p.is_empty());
        self.record.tools.push(tool);
        self
    }

    /// Merge variables into the existing set
    pub fn set_variables<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.record.variables.merge(pairs);
        self
    }

    pub fn set_outcome(&mut self, outcome: Outcome) -> &mut Self {
        self.record.outcome = outcome;
        self
    }

    pub fn set_notification(&mut self, notification: Notification) -> &mut Self {
        self.record.notification = notification;
        self
    }

    /// Current in-progress record
    pub fn record(&self) -> &IstvonRecord {
        &self.record
    }

    /// Validate and return a copy of the record.
    ///
    /// On failure the in-progress record is untouched, so the caller can fix
    /// the offending section and try again.
    pub fn build(&self) -> Result<IstvonRecord, BuildError> {
        let result = self.validator.validate(&self.record);
        if result.valid {
            return Ok(self.record.clone());
        }

        let reason = result.first_error().unwrap_or("unknown error");
        tracing::debug!(error = reason, "builder output rejected");
        Err(BuildError::InvalidStructure {
            message: format!("Invalid ISTVON structure: {}", reason),
        })
    }

    /// Copy of the record plus a required-only partial validation
    pub fn build_partial(&self) -> PartialBuild {
        let result = match self.record.to_map() {
            Ok(map) => self.validator.validate_partial(&map, true),
            Err(e) => {
                return PartialBuild {
                    record: self.record.clone(),
                    valid: false,
                    errors: vec![format!("Unexpected validation error: {}", e)],
                }
            }
        };

        PartialBuild {
            record: self.record.clone(),
            valid: result.valid,
            errors: result.errors,
        }
    }
}
