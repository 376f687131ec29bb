//! `istvon template` command - browse and render predefined templates

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{parse_key_value, truncate_str, vars_to_map};
use crate::cli::output;
use crate::core::config::Config;
use crate::schema::template::{TemplateCategory, TemplateLibrary};

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List available templates
    List(ListArgs),

    /// Render a template into a record
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only templates of this category
    #[arg(long, short = 'c')]
    pub category: Option<TemplateCategory>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Template name
    pub name: String,

    /// Template variable as KEY=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,
}

pub fn run(cmd: TemplateCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let library = TemplateLibrary::load()?;
    match cmd {
        TemplateCommands::List(args) => list_templates(&library, args, global),
        TemplateCommands::Show(args) => {
            let record = library.render(&args.name, &vars_to_map(&args.vars))?;
            output::print(&record, global.format.resolve(config.default_format.as_deref()))
        }
    }
}

fn list_templates(library: &TemplateLibrary, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let templates = library.list(args.category);

    if global.format != OutputFormat::Auto {
        let rows: Vec<serde_json::Value> = templates
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "category": t.category,
                    "description": t.description,
                })
            })
            .collect();
        return output::print(&rows, global.format);
    }

    if templates.is_empty() {
        if !global.quiet {
            println!("No templates found.");
        }
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["NAME", "CATEGORY", "DESCRIPTION"]);
    for t in &templates {
        builder.push_record([
            t.name.clone(),
            t.category.label().to_string(),
            truncate_str(&t.description, 50),
        ]);
    }
    println!("{}", builder.build().with(Style::sharp()));

    if !global.quiet {
        println!(
            "\n{} template(s). Render one with {}",
            style(templates.len()).cyan(),
            style("istvon template show <NAME> --var topic=...").bold()
        );
    }
    Ok(())
}
