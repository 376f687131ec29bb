//! `istvon convert` command - map a prompt onto an ISTVON record

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_history;
use crate::cli::output;
use crate::core::config::Config;
use crate::core::record::IstvonRecord;
use crate::mapper::IstvonMapper;
use crate::schema::validator::{ValidationResult, Validator};

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// The free-form prompt to convert
    pub prompt: String,

    /// Print improvement suggestions after the record
    #[arg(long)]
    pub suggest: bool,

    /// Do not record this conversion in history
    #[arg(long)]
    pub no_save: bool,
}

pub fn run(args: ConvertArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let prompt = args.prompt.trim();
    if prompt.is_empty() {
        return Err(miette::miette!(
            help = "Pass the task to structure, e.g. `istvon convert \"Summarize this report\"`",
            "Please enter a prompt to convert"
        ));
    }

    let registry = config.schema_registry()?;
    let validator = Validator::new(&registry)?;

    let record = IstvonMapper::new().convert(prompt);
    let result = validator.validate(&record);

    if !args.no_save && config.save_history() {
        save_conversion(config, prompt, &record, &result, global.quiet);
    }

    if !result.valid {
        eprintln!("{} Generated structure failed validation", style("✗").red());
        output::print_issues(&result.issues);
        return Err(miette::miette!(
            "Generated structure failed validation: {}",
            result.first_error().unwrap_or("unknown error")
        ));
    }

    output::print(&record, global.format.resolve(config.default_format.as_deref()))?;

    if args.suggest {
        let value = serde_json::to_value(&record).map_err(|e| miette::miette!("{}", e))?;
        output::print_suggestions(&validator.suggestions(&value));
    }

    Ok(())
}

/// History is best effort; a broken store never fails the conversion
fn save_conversion(config: &Config, prompt: &str, record: &IstvonRecord, result: &ValidationResult, quiet: bool) {
    let saved = open_history(config).and_then(|store| {
        let conversion = if result.valid {
            store.record_success(prompt, record, true)?
        } else {
            store.record_failure(prompt, result.first_error().unwrap_or("validation failed"))?
        };
        Ok(conversion)
    });

    match saved {
        Ok(conversion) if !quiet => {
            eprintln!(
                "{} Recorded as {} (used {}x)",
                style("→").blue(),
                style(&conversion.id).cyan(),
                conversion.times_used
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not record conversion"),
    }
}
