//! Input error diagnostics pointing at the offending source location

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Caller-supplied JSON or YAML that cannot be read as the expected shape
#[derive(Debug, Error, Diagnostic)]
#[error("Malformed input: {message}")]
#[diagnostic(code(istvon::input::malformed))]
pub struct MalformedInputError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying error message
    message: String,
}

impl MalformedInputError {
    /// Create an error from a serde_yml parse failure
    pub fn from_yaml_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    /// Create an error from a serde_json parse failure
    pub fn from_json_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        let line = err.line().max(1);
        let column = err.column().max(1);
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    /// Create an error at a specific location
    pub fn at_location(
        message: impl Into<String>,
        source: &str,
        filename: &str,
        line: usize,
        column: usize,
    ) -> Self {
        let message = message.into();
        let offset = line_col_to_offset(source, line, column).min(source.len());

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(source.len().max(1))),
            help: generate_help(&message),
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

/// Suggest a fix based on the parser's message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("missing field") {
        return Some(
            "An ISTVON record needs instructions, source_data, tools, variables, outcome and notification"
                .to_string(),
        );
    }

    if msg_lower.contains("expected a mapping") || msg_lower.contains("expected an object") {
        return Some("The top level must be a mapping of ISTVON fields".to_string());
    }

    if msg_lower.contains("trailing comma") {
        return Some("JSON does not allow a comma after the last item".to_string());
    }

    if msg_lower.contains("expected ','") || msg_lower.contains("expected `,`") {
        return Some("Add commas between items: [item1, item2, item3]".to_string());
    }

    if msg_lower.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs".to_string());
    }

    if msg_lower.contains("duplicate") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation".to_string());
    }

    None
}
