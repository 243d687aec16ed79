//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::{Confirm, Select};
use tracing::info;

use chronicle_core::config::{parse_config, Config, DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};

use crate::cli::output::{self, path_style};
use crate::cli::Cli;

/// Write a default configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Configuration file syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        let format = if self.yes {
            format_for_path(&config_path)
        } else {
            let formats = ["yaml", "toml"];
            let default = usize::from(format_for_path(&config_path) == ConfigFormat::Toml);
            let selection = Select::new()
                .with_prompt("Configuration format")
                .items(&formats)
                .default(default)
                .interact()?;
            if selection == 1 {
                ConfigFormat::Toml
            } else {
                ConfigFormat::Yaml
            }
        };

        let config_path = match format {
            ConfigFormat::Toml if config_path.extension().is_some_and(|e| e != "toml") => {
                config_path.with_extension("toml")
            }
            _ => config_path,
        };

        let content = render_template(format)?;
        std::fs::write(&config_path, &content)?;
        info!(path = %config_path.display(), "configuration written");

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!(
                "  1. Edit {} to adjust parsers and groups",
                config_path.display()
            );
            println!(
                "  2. Run {} to check the rules",
                style("chronicle validate").cyan()
            );
            println!(
                "  3. Run {} to preview the changelog",
                style("chronicle changelog").cyan()
            );
        }

        Ok(())
    }
}

fn format_for_path(path: &Path) -> ConfigFormat {
    if path.extension().is_some_and(|e| e == "toml") {
        ConfigFormat::Toml
    } else {
        ConfigFormat::Yaml
    }
}

/// The commented template, or its TOML translation
fn render_template(format: ConfigFormat) -> anyhow::Result<String> {
    match format {
        ConfigFormat::Yaml => Ok(DEFAULT_CONFIG_TEMPLATE.to_string()),
        ConfigFormat::Toml => {
            let config: Config = parse_config(DEFAULT_CONFIG_TEMPLATE, false)?;
            Ok(toml::to_string_pretty(&config)?)
        }
    }
}
