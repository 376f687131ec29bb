//! ISTVON: structured prompts from free-form text
//!
//! Maps natural-language task prompts onto the six-part ISTVON record
//! (Instructions, Source data, Tools, Variables, Outcome, Notification),
//! validates records against a JSON Schema and assembles them incrementally.

pub mod cli;
pub mod core;
pub mod history;
pub mod mapper;
pub mod schema;
pub mod yaml;

pub use crate::core::record::IstvonRecord;
pub use mapper::{map_prompt, IstvonMapper};
pub use schema::{IstvonBuilder, SchemaRegistry, Validator};
