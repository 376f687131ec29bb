//! Schema introspection
//!
//! Shows the fields and enumerations of the active ISTVON schema so users and
//! scripts can see what a valid record looks like without reading the JSON.

use clap::Subcommand;
use miette::Result;
use serde_json::Value;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::truncate_str;
use crate::cli::output;
use crate::core::config::Config;

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the fields of the ISTVON schema
    Show(ShowArgs),

    /// List every enumerated field and its allowed values
    Enums,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    match cmd {
        SchemaCommands::Show(args) => show_schema(args, config),
        SchemaCommands::Enums => show_enums(global, config),
    }
}

fn show_schema(args: ShowArgs, config: &Config) -> Result<()> {
    let registry = config.schema_registry()?;

    if args.raw {
        println!("{}", registry.source().trim_end());
        return Ok(());
    }

    let schema = registry.schema();
    let title = schema["title"].as_str().unwrap_or("ISTVON");
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    if let Some(desc) = schema["description"].as_str() {
        println!("{}\n", desc);
    }

    let required = registry.required_fields();
    println!("{:<16} {:<12} {:<8} {}", "NAME", "TYPE", "REQ", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    if let Some(props) = registry.properties() {
        for (name, prop) in props {
            let is_required = if required.contains(&name.as_str()) { "yes" } else { "" };
            let desc = truncate_str(prop["description"].as_str().unwrap_or(""), 40);
            println!("{:<16} {:<12} {:<8} {}", name, get_type_str(prop), is_required, desc);
        }
    }

    println!("\nUse 'istvon schema enums' for allowed values, --raw for the full JSON schema");
    Ok(())
}

fn show_enums(global: &GlobalOpts, config: &Config) -> Result<()> {
    let registry = config.schema_registry()?;
    let enums = registry.field_enums();

    if global.format != OutputFormat::Auto {
        return output::print(&enums, global.format);
    }

    for (path, values) in &enums {
        println!("{:<24} {}", path, values.join(", "));
    }
    Ok(())
}

fn get_type_str(prop: &Value) -> String {
    match prop["type"].as_str() {
        Some("array") => match prop["items"]["type"].as_str() {
            Some(items) => format!("{}[]", items),
            None => "array".to_string(),
        },
        Some(t) => t.to_string(),
        None => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_strings() {
        assert_eq!(get_type_str(&json!({"type": "array", "items": {"type": "object"}})), "object[]");
        assert_eq!(get_type_str(&json!({"type": "array"})), "array");
        assert_eq!(get_type_str(&json!({"type": "string"})), "string");
        assert_eq!(get_type_str(&json!({})), "any");
    }
}
