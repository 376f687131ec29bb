//! Schema system - registry, validation, building and templates

pub mod builder;
pub mod registry;
pub mod template;
pub mod validator;
pub mod wizard;

pub use builder::{BuildError, IstvonBuilder, PartialBuild};
pub use registry::{SchemaLoadError, SchemaRegistry};
pub use template::{IstvonTemplate, TemplateCategory, TemplateError, TemplateLibrary};
pub use validator::{Suggestions, ValidationIssue, ValidationResult, Validator};
pub use wizard::BuilderWizard;
