//! CLI command implementations

pub mod build;
pub mod completions;
pub mod convert;
pub mod history;
pub mod schema;
pub mod template;
pub mod validate;
