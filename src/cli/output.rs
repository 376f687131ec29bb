//! Rendering records, suggestions and validation issues for the terminal

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::schema::validator::{Suggestions, ValidationIssue};

/// Serialize any value in the requested format. `Auto` renders as JSON.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(value).into_diagnostic(),
        OutputFormat::Json | OutputFormat::Auto => serde_json::to_string_pretty(value).into_diagnostic(),
    }
}

/// Print a value to stdout in the requested format
pub fn print<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = render(value, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Suggestions grouped by field, one advisory per line
pub fn format_suggestions(suggestions: &Suggestions) -> String {
    let mut out = String::new();
    for (field, advice) in suggestions {
        out.push_str(&format!("{}:\n", field));
        for line in advice {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

pub fn print_suggestions(suggestions: &Suggestions) {
    if suggestions.is_empty() {
        eprintln!("{} No suggestions", style("✓").green());
        return;
    }
    eprintln!();
    eprintln!("{}", style("Suggestions for improvement").bold());
    eprint!("{}", format_suggestions(suggestions));
}

/// Print validation issues with path, message and hint
pub fn print_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        let path = if issue.path.is_empty() { "(root)" } else { issue.path.as_str() };
        println!("    {} {}", style(path).cyan(), issue.message);
        if let Some(ref hint) = issue.suggestion {
            println!("      {} {}", style("help:").yellow(), hint);
        }
    }
}
