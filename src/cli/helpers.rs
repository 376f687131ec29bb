//! Shared helper functions for CLI commands

use console::style;
use miette::Result;
use std::collections::BTreeMap;

use crate::core::config::Config;
use crate::core::record::IstvonRecord;
use crate::history::{ConversionStore, FeedbackComponent};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a `key=value` pair (clap value parser for `--var`)
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Parse a `section=rating` pair (clap value parser for `--component`)
///
/// Range checking is left to the history store so the message matches the
/// overall rating's.
pub fn parse_component_rating(s: &str) -> Result<(FeedbackComponent, u8), String> {
    let (key, value) = parse_key_value(s)?;
    let component = key.parse::<FeedbackComponent>()?;
    let rating = value
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("rating for {} must be a number from 1 to 5, got '{}'", component, value))?;
    Ok((component, rating))
}

/// Parse a `section=text` pair (clap value parser for `--improve`)
pub fn parse_component_note(s: &str) -> Result<(FeedbackComponent, String), String> {
    let (key, value) = parse_key_value(s)?;
    Ok((key.parse::<FeedbackComponent>()?, value))
}

/// Collect `--var` pairs; later values win
pub fn vars_to_map(vars: &[(String, String)]) -> BTreeMap<String, String> {
    vars.iter().cloned().collect()
}

/// Open the history store named by the configuration
pub fn open_history(config: &Config) -> Result<ConversionStore> {
    Ok(ConversionStore::open(&config.history_path())?)
}

/// Store a built record in history unless disabled
pub fn save_built(config: &Config, no_save: bool, quiet: bool, record: &IstvonRecord) -> Result<()> {
    if no_save || !config.save_history() {
        return Ok(());
    }
    let store = open_history(config)?;
    let conversion = store.record_success(&record.instructions, record, true)?;
    if !quiet {
        eprintln!("{} Saved as {}", style("✓").green(), style(&conversion.id).cyan());
    }
    Ok(())
}
