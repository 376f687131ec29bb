//! `istvon validate` command - validate record files against the schema

use console::style;
use miette::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::args::GlobalOpts;
use crate::cli::output;
use crate::core::config::Config;
use crate::schema::validator::{Suggestions, ValidationResult, Validator};
use crate::yaml;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (.json, .yaml, .yml)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Validate fields individually, allowing incomplete records
    #[arg(long)]
    pub partial: bool,

    /// With --partial, also report missing required fields
    #[arg(long, requires = "partial")]
    pub required_only: bool,

    /// Print improvement suggestions for each file
    #[arg(long)]
    pub suggest: bool,

    /// Continue validation after first failing file
    #[arg(long)]
    pub keep_going: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let registry = config.schema_registry()?;
    let validator = Validator::new(&registry)?;

    let files = expand_paths(&args.paths);
    let mut stats = ValidationStats::default();

    if !global.quiet {
        println!("{} Validating {} file(s)...\n", style("→").blue(), files.len());
    }

    for path in &files {
        stats.files_checked += 1;

        match check_file(path, &args, &validator) {
            Ok((result, suggestions)) if result.valid => {
                stats.files_passed += 1;
                if !global.quiet {
                    println!("{} {}", style("✓").green(), path.display());
                }
                if let Some(suggestions) = suggestions {
                    output::print_suggestions(&suggestions);
                }
            }
            Ok((result, _)) => {
                stats.files_failed += 1;
                stats.total_errors += result.errors.len();
                println!(
                    "{} {} - {} error(s)",
                    style("✗").red(),
                    path.display(),
                    result.errors.len()
                );
                output::print_issues(&result.issues);
                if !args.keep_going {
                    break;
                }
            }
            Err(report) => {
                stats.files_failed += 1;
                stats.total_errors += 1;
                println!("{} {}", style("✗").red(), path.display());
                println!("{:?}", report);
                if !args.keep_going {
                    break;
                }
            }
        }
    }

    if !global.quiet {
        print_summary(&stats);
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

type FileOutcome = (ValidationResult, Option<Suggestions>);

fn check_file(path: &Path, args: &ValidateArgs, validator: &Validator) -> Result<FileOutcome> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let filename = path.display().to_string();

    let value = if args.partial {
        serde_json::Value::Object(yaml::parse_partial(&content, &filename)?)
    } else {
        yaml::parse_value(&content, &filename)?
    };

    let result = match value.as_object() {
        Some(map) if args.partial => validator.validate_partial(map, args.required_only),
        _ => validator.validate_value(&value),
    };

    let suggestions = args.suggest.then(|| validator.suggestions(&value));
    Ok((result, suggestions))
}

/// Expand directories into their record files; explicit files are kept as given
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.') || e.depth() == 0)
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && yaml::is_record_file(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}

fn print_summary(stats: &ValidationStats) {
    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Validation Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Files checked:  {}", style(stats.files_checked).cyan());
    println!("  Files passed:   {}", style(stats.files_passed).green());
    println!("  Files failed:   {}", style(stats.files_failed).red());
    println!("  Total errors:   {}", style(stats.total_errors).red());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_paths_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join("b.yaml"), "").unwrap();
        std::fs::write(dir.path().join("a.json"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("nested").join("c.yml"), "").unwrap();
        std::fs::write(dir.path().join(".hidden").join("d.json"), "").unwrap();

        let files = expand_paths(&[dir.path().to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, ["a.json", "b.yaml", "nested/c.yml"]);
    }

    #[test]
    fn test_explicit_files_kept() {
        let files = expand_paths(&[PathBuf::from("does-not-exist.txt")]);
        assert_eq!(files, [PathBuf::from("does-not-exist.txt")]);
    }
}
