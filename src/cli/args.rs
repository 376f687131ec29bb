//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    build::BuildArgs, completions::CompletionsArgs, convert::ConvertArgs, history::HistoryCommands,
    schema::SchemaCommands, template::TemplateCommands, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "istvon")]
#[command(author, version, about = "Turn free-form prompts into structured ISTVON records")]
#[command(long_about = "Maps natural-language task prompts onto the ISTVON structure \
(Instructions, Source data, Tools, Variables, Outcome, Notification), validates records \
against the ISTVON JSON Schema and assembles them interactively.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Extra configuration file layered over the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a free-form prompt into an ISTVON record
    Convert(ConvertArgs),

    /// Validate ISTVON files (JSON or YAML) against the schema
    Validate(ValidateArgs),

    /// Inspect the ISTVON schema
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Browse and render predefined templates
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Build a record interactively
    Build(BuildArgs),

    /// Browse, rate and summarize past conversions
    #[command(subcommand)]
    History(HistoryCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default, else JSON
    #[default]
    Auto,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Resolve `Auto` against the configured default format
    pub fn resolve(self, configured: Option<&str>) -> OutputFormat {
        match self {
            OutputFormat::Auto => match configured.map(|s| s.to_lowercase()).as_deref() {
                Some("yaml") | Some("yml") => OutputFormat::Yaml,
                _ => OutputFormat::Json,
            },
            other => other,
        }
    }
}
