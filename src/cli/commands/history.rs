//! `istvon history` command - browse, rate and summarize past conversions

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{open_history, parse_component_note, parse_component_rating, truncate_str};
use crate::cli::output;
use crate::core::config::Config;
use crate::history::{ComponentFeedback, Conversion, FeedbackComponent, HistoryStats};

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recent conversions, newest first
    List(ListArgs),

    /// Show one conversion in full
    Show(ShowArgs),

    /// Rate a conversion from 1 to 5
    Rate(RateArgs),

    /// Usage statistics
    Stats,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Maximum number of entries
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,

    /// Include failed conversions
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Conversion id (or a unique prefix of it)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct RateArgs {
    /// Conversion id (or a unique prefix of it)
    pub id: String,

    /// Rating from 1 (poor) to 5 (excellent)
    pub rating: u8,

    /// Free-text feedback
    #[arg(long)]
    pub feedback: Option<String>,

    /// Rate one section, e.g. `--component tools=4` (repeatable)
    #[arg(long = "component", value_name = "SECTION=RATING", value_parser = parse_component_rating)]
    pub components: Vec<(FeedbackComponent, u8)>,

    /// Suggest an improvement for one section, e.g. `--improve variables="set an audience"`
    #[arg(long = "improve", value_name = "SECTION=TEXT", value_parser = parse_component_note)]
    pub improvements: Vec<(FeedbackComponent, String)>,
}

impl RateArgs {
    fn component_feedback(&self) -> ComponentFeedback {
        ComponentFeedback {
            ratings: self.components.iter().copied().collect(),
            suggested_improvements: self.improvements.iter().cloned().collect(),
        }
    }
}

/// A conversion together with its per-section feedback
#[derive(Serialize)]
struct ConversionDetail {
    #[serde(flatten)]
    conversion: Conversion,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_feedback: Option<ComponentFeedback>,
}

pub fn run(cmd: HistoryCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let store = open_history(config)?;

    match cmd {
        HistoryCommands::List(args) => {
            let conversions = store.recent(args.limit, args.all)?;
            if global.format != OutputFormat::Auto {
                return output::print(&conversions, global.format);
            }
            print_table(&conversions, global.quiet);
            Ok(())
        }
        HistoryCommands::Show(args) => {
            let conversion = store.get(&args.id)?;
            let component_feedback = store.component_feedback(&conversion.id)?;
            let detail = ConversionDetail {
                conversion,
                component_feedback,
            };
            output::print(&detail, global.format.resolve(config.default_format.as_deref()))
        }
        HistoryCommands::Rate(args) => {
            let sections = args.component_feedback();
            // Reject bad section ratings before anything is written
            sections.check()?;

            let conversion = store.rate(&args.id, args.rating, args.feedback.as_deref())?;
            if !sections.is_empty() {
                store.give_feedback(&conversion.id, &sections)?;
            }
            if !global.quiet {
                println!(
                    "{} Rated {} with {}/5",
                    style("✓").green(),
                    style(&conversion.id).cyan(),
                    args.rating
                );
                for (component, rating) in &sections.ratings {
                    println!("  {:<14} {}/5", component.as_str(), rating);
                }
            }
            Ok(())
        }
        HistoryCommands::Stats => {
            let stats = store.stats()?;
            if global.format != OutputFormat::Auto {
                return output::print(&stats, global.format);
            }
            print_stats(&stats);
            Ok(())
        }
    }
}

fn print_table(conversions: &[Conversion], quiet: bool) {
    if conversions.is_empty() {
        if !quiet {
            println!("No conversions recorded yet.");
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "CREATED", "OK", "USED", "RATING", "PROMPT"]);
    for c in conversions {
        builder.push_record([
            c.id.clone(),
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
            if c.success { "yes" } else { "no" }.to_string(),
            c.times_used.to_string(),
            c.rating.map(|r| r.to_string()).unwrap_or_default(),
            truncate_str(&c.original_prompt, 40),
        ]);
    }
    println!("{}", builder.build().with(Style::sharp()));
}

fn print_stats(stats: &HistoryStats) {
    println!("{}", style("Conversion History").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Total:        {}", style(stats.total).cyan());
    println!("  Successful:   {}", style(stats.successful).green());
    println!("  Failed:       {}", style(stats.failed).red());
    println!("  Success rate: {:.1}%", stats.success_rate() * 100.0);
    match stats.average_rating {
        Some(avg) => println!("  Avg rating:   {:.2}", avg),
        None => println!("  Avg rating:   -"),
    }

    if !stats.top_tools.is_empty() {
        println!("\n{}", style("Most used tools").bold());
        for (name, count) in &stats.top_tools {
            println!("  {:<20} {}", name, count);
        }
    }
    if !stats.top_formats.is_empty() {
        println!("\n{}", style("Most common formats").bold());
        for (name, count) in &stats.top_formats {
            println!("  {:<20} {}", name, count);
        }
    }
    if !stats.top_topics.is_empty() {
        println!("\n{}", style("Most common topics").bold());
        for (name, count) in &stats.top_topics {
            println!("  {:<20} {}", truncate_str(name, 20), count);
        }
    }
}
