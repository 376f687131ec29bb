//! Interactive wizard for assembling an ISTVON record
//!
//! Every enumerated choice is offered as a `Select` whose items come from the
//! schema, so the wizard never hard-codes allowed values.

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;

use crate::core::record::{IstvonRecord, Notification, Outcome, Variables};
use crate::schema::builder::{IstvonBuilder, PartialBuild};
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

/// Sections the wizard walks through, in order
const SECTIONS: [&str; 6] = [
    "Instructions",
    "Source data",
    "Tools",
    "Variables",
    "Outcome",
    "Notification",
];

/// A schema-driven wizard around `IstvonBuilder`
pub struct BuilderWizard<'a> {
    validator: &'a Validator,
    enums: BTreeMap<String, Vec<String>>,
    theme: ColorfulTheme,
}

impl<'a> BuilderWizard<'a> {
    pub fn new(registry: &SchemaRegistry, validator: &'a Validator) -> Self {
        Self {
            validator,
            enums: registry.field_enums(),
            theme: ColorfulTheme::default(),
        }
    }

    /// Run every section, then build. A rejected build sends the user back to
    /// a section of their choice.
    pub fn run(&self, seed: Option<IstvonRecord>) -> Result<IstvonRecord> {
        let mut builder = match seed {
            Some(record) => IstvonBuilder::from_record(self.validator, record),
            None => IstvonBuilder::new(self.validator),
        };

        println!();
        println!("{} Building a new ISTVON prompt", style("◆").cyan());
        println!("{}", style("─".repeat(50)).dim());

        for section in 0..SECTIONS.len() {
            self.run_section(&mut builder, section)?;
        }

        loop {
            match builder.build() {
                Ok(record) => {
                    println!();
                    println!("{} Record is valid", style("✓").green());
                    return Ok(record);
                }
                Err(e) => {
                    println!();
                    println!("{} {}", style("✗").red(), e);
                    let section = Select::with_theme(&self.theme)
                        .with_prompt("Which section do you want to fix?")
                        .items(&SECTIONS)
                        .default(0)
                        .interact()
                        .into_diagnostic()?;
                    self.run_section(&mut builder, section)?;
                }
            }
        }
    }

    fn run_section(&self, builder: &mut IstvonBuilder<'_>, section: usize) -> Result<()> {
        println!();
        println!("{}", style(SECTIONS[section]).bold());

        match section {
            0 => self.prompt_instructions(builder)?,
            1 => self.prompt_sources(builder)?,
            2 => self.prompt_tools(builder)?,
            3 => self.prompt_variables(builder)?,
            4 => self.prompt_outcome(builder)?,
            _ => self.prompt_notification(builder)?,
        }

        report_partial(&builder.build_partial());
        Ok(())
    }

    fn prompt_instructions(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        let current = builder.record().instructions.clone();
        let text = self.input("What should the model do?", &current, false)?;
        builder.set_instructions(text);
        Ok(())
    }

    fn prompt_sources(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        while self.confirm("Add a data source?", false)? {
            let kind = self.select("source_data.type", "Source type", None)?;
            let source = self.input("Source (path, URL, name...)", "", false)?;
            let description = self.input("Description", "", true)?;
            let required = self.confirm("Is this source required?", false)?;
            builder.add_source_data(&kind, &source, &description, required);
        }
        Ok(())
    }

    fn prompt_tools(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        let current = builder.record().tool_names().join(", ");
        let keep = self.confirm(&format!("Keep tools [{}]?", current), true)?;
        if keep {
            return Ok(());
        }

        builder.clear_tools();
        loop {
            let name = self.input("Tool name", "", false)?;
            let version = self.input("Version", "", true)?;
            builder.add_tool(&name, Some(&version), None);
            if !self.confirm("Add another tool?", false)? {
                break;
            }
        }
        Ok(())
    }

    fn prompt_variables(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        let vars = builder.record().variables.clone();
        let mut pairs: Vec<(String, String)> = Vec::new();

        for key in [Variables::TOPIC, Variables::TARGET_AUDIENCE, Variables::LENGTH, Variables::LANGUAGE] {
            let current = vars.get_str(key).unwrap_or("");
            let value = self.input(&title_case(key), current, true)?;
            if !value.is_empty() {
                pairs.push((key.to_string(), value));
            }
        }

        pairs.push((
            Variables::TONE.to_string(),
            self.select("variables.tone", "Tone", vars.tone())?,
        ));
        pairs.push((
            Variables::PRIORITY.to_string(),
            self.select("variables.priority", "Priority", vars.priority())?,
        ));

        builder.set_variables(pairs);
        Ok(())
    }

    fn prompt_outcome(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        let current = builder.record().outcome.clone();
        let format = self.select("outcome.format", "Output format", Some(&current.format))?;
        let delivery = self.select("outcome.delivery", "Delivery", Some(&current.delivery))?;

        let mut outcome = Outcome::new(format, delivery.clone());
        if delivery == "save_to_file" {
            let filename = self.input("Filename", current.filename.as_deref().unwrap_or(""), true)?;
            outcome = outcome.with_filename(&filename);
        } else if delivery != "display" {
            let destination = self.input("Destination", current.destination.as_deref().unwrap_or(""), true)?;
            outcome = outcome.with_destination(&destination);
        }

        builder.set_outcome(outcome);
        Ok(())
    }

    fn prompt_notification(&self, builder: &mut IstvonBuilder<'_>) -> Result<()> {
        let current = builder.record().notification.clone();
        let method = self.select("notification.method", "Notification method", Some(&current.method))?;
        if method == "none" {
            builder.set_notification(Notification::new(method));
            return Ok(());
        }

        let trigger = self.select("notification.trigger", "Notify when", Some(&current.trigger))?;
        let recipient = self.input("Recipient", current.recipient.as_deref().unwrap_or(""), true)?;
        let template = self.input("Message template", "", true)?;
        builder.set_notification(
            Notification::new(method)
                .with_trigger(trigger)
                .with_recipient(&recipient)
                .with_message_template(&template),
        );
        Ok(())
    }

    /// Pick one value of an enumerated schema field
    fn select(&self, path: &str, prompt: &str, current: Option<&str>) -> Result<String> {
        let values = self
            .enums
            .get(path)
            .ok_or_else(|| miette::miette!("Schema declares no values for {}", path))?;

        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(values)
            .default(default_index(values, current))
            .interact()
            .into_diagnostic()?;

        Ok(values[selection].clone())
    }

    fn input(&self, prompt: &str, default: &str, allow_empty: bool) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_empty);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        input.interact_text().into_diagnostic()
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .into_diagnostic()
    }
}

fn report_partial(partial: &PartialBuild) {
    for error in &partial.errors {
        println!("  {} {}", style("!").yellow(), error);
    }
}

/// Index of `current` within `values`, or 0
fn default_index(values: &[String], current: Option<&str>) -> usize {
    current
        .and_then(|c| values.iter().position(|v| v == c))
        .unwrap_or(0)
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
