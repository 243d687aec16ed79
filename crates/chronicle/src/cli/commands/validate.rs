//! Validate command

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use chronicle_changelog::ChangelogGenerator;
use chronicle_core::config::{load_config_from_dir, Config};
use chronicle_core::ConfigError;
use chronicle_git::GitRepo;

use crate::cli::output::{self, header, key_value, path_style};
use crate::cli::{Cli, OutputFormat};

/// Check the configuration and compile its rules
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Only validate configuration file
    #[arg(long)]
    pub config_only: bool,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of a validation run
#[derive(Debug, Default, Serialize)]
struct ValidationReport {
    valid: bool,
    config_path: Option<PathBuf>,
    /// Config path of the offending field
    field: Option<String>,
    parsers: usize,
    preprocessors: usize,
    link_parsers: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            config_only = self.config_only,
            strict = self.strict,
            "executing validate command"
        );
        let cwd = std::env::current_dir()?;
        let mut report = ValidationReport::default();
        let mut failure: Option<ConfigError> = None;

        match load_config_from_dir(&cwd) {
            Ok((config, path)) => {
                report.config_path = Some(path);
                if let Err(e) = check_rules(&config, &mut report) {
                    failure = Some(e);
                }
                if !self.config_only {
                    check_repository(&cwd, &config, &mut report);
                }
            }
            Err(e) => {
                report.errors.push(format!("Configuration: {}", e));
                report.field = e.field().map(str::to_string);
                failure = Some(e);
            }
        }

        if self.strict {
            let mut warnings = std::mem::take(&mut report.warnings);
            report.errors.append(&mut warnings);
        }
        report.valid = report.errors.is_empty();

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text if !cli.quiet => print_report(&report),
            OutputFormat::Text => {}
        }

        if let Some(err) = failure {
            return Err(err.into());
        }
        if !report.valid {
            anyhow::bail!("validation failed with {} error(s)", report.errors.len());
        }

        Ok(())
    }
}

/// Compile the rule set and formatter exactly as `changelog` would
fn check_rules(config: &Config, report: &mut ValidationReport) -> Result<(), ConfigError> {
    match ChangelogGenerator::new(config.changelog.clone()) {
        Ok(generator) => {
            let rules = generator.rules();
            report.parsers = rules.parsers.len();
            report.preprocessors = rules.preprocessors.len();
            report.link_parsers = rules.link_parsers.len();
            if rules.parsers.is_empty() {
                report
                    .warnings
                    .push("No commit parsers configured, every commit is unconventional".to_string());
            }
            Ok(())
        }
        Err(e) => {
            report.errors.push(format!("Rules: {}", e));
            report.field = e.field().map(str::to_string);
            Err(e)
        }
    }
}

fn check_repository(cwd: &std::path::Path, config: &Config, report: &mut ValidationReport) {
    match GitRepo::discover(cwd) {
        Ok(repo) => match repo.resolve_commit(&config.git.revision) {
            Ok(Some(_)) => {}
            Ok(None) => report.warnings.push("Repository has no commits yet".to_string()),
            Err(e) => report.errors.push(format!("Revision: {}", e)),
        },
        Err(e) => report.warnings.push(format!("Git repository: {}", e)),
    }
}

fn print_report(report: &ValidationReport) {
    println!("{}", header("Validation Results"));
    println!();

    if let Some(path) = &report.config_path {
        println!("{}", key_value("Config", &path_style().apply_to(path.display()).to_string()));
        println!("{}", key_value("Parsers", &report.parsers.to_string()));
        println!("{}", key_value("Preprocessors", &report.preprocessors.to_string()));
        println!("{}", key_value("Link parsers", &report.link_parsers.to_string()));
        println!();
    }

    if !report.errors.is_empty() {
        println!("{}", style("Errors:").red().bold());
        for error in &report.errors {
            println!("  {} {}", style("✗").red(), error);
        }
        println!();
    }

    for warning in &report.warnings {
        output::warning(warning);
    }

    if report.valid {
        output::success("Configuration is valid");
    }
}
