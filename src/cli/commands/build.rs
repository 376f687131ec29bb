//! `istvon build` command - assemble a record interactively

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{parse_key_value, save_built, vars_to_map};
use crate::cli::output;
use crate::core::config::Config;
use crate::core::record::IstvonRecord;
use crate::schema::template::TemplateLibrary;
use crate::schema::validator::Validator;
use crate::schema::wizard::BuilderWizard;
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Start from a predefined template
    #[arg(long, short = 't', conflicts_with = "from")]
    pub template: Option<String>,

    /// Start from an existing record file (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub from: Option<PathBuf>,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_key_value, requires = "template")]
    pub vars: Vec<(String, String)>,

    /// Do not record the built prompt in history
    #[arg(long)]
    pub no_save: bool,
}

pub fn run(args: BuildArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let registry = config.schema_registry()?;
    let validator = Validator::new(&registry)?;

    let seed = match (&args.template, &args.from) {
        (Some(name), _) => {
            let library = TemplateLibrary::load()?;
            let record = library.render(name, &vars_to_map(&args.vars))?;
            if !global.quiet {
                eprintln!("{} Starting from template {}", style("→").blue(), style(name).cyan());
            }
            Some(record)
        }
        (None, Some(path)) => {
            let record = read_seed(path)?;
            if !global.quiet {
                eprintln!("{} Starting from {}", style("→").blue(), style(path.display()).cyan());
            }
            Some(record)
        }
        (None, None) => None,
    };

    let record = BuilderWizard::new(&registry, &validator).run(seed)?;

    output::print(&record, global.format.resolve(config.default_format.as_deref()))?;
    save_built(config, args.no_save, global.quiet, &record)
}

/// Load a record file to seed the wizard
fn read_seed(path: &Path) -> Result<IstvonRecord> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    Ok(yaml::parse_record(&content, &path.display().to_string())?)
}
