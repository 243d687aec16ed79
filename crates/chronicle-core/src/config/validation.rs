//! Configuration validation
//!
//! Structural checks only. Pattern compilation and the group-or-skip rule
//! check happen when the changelog rule set is built, which reports failures
//! with the same field paths.

use tracing::debug;

use crate::error::ConfigError;

use super::types::Config;

/// Output formats the renderer understands
pub const VALID_FORMATS: &[&str] = &["markdown", "md", "json"];

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    debug!("validating configuration");
    validate_git(config)?;
    validate_changelog(config)?;
    validate_rules(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_git(config: &Config) -> Result<(), ConfigError> {
    if config.git.revision.trim().is_empty() {
        return Err(ConfigError::invalid("git.revision", "revision cannot be empty"));
    }

    if config.git.limit_commits == Some(0) {
        return Err(ConfigError::invalid(
            "git.limit_commits",
            "must be greater than zero",
        ));
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<(), ConfigError> {
    if !VALID_FORMATS.contains(&config.changelog.format.as_str()) {
        return Err(ConfigError::invalid(
            "changelog.format",
            format!("must be one of: {}", VALID_FORMATS.join(", ")),
        ));
    }

    Ok(())
}

fn validate_rules(config: &Config) -> Result<(), ConfigError> {
    let changelog = &config.changelog;

    for (i, rule) in changelog.commit_preprocessors.iter().enumerate() {
        if rule.pattern.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "changelog.commit_preprocessors[{}].pattern",
                i
            )));
        }
    }

    for (i, rule) in changelog.commit_parsers.iter().enumerate() {
        if rule.group.as_deref().is_some_and(|g| g.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("changelog.commit_parsers[{}].group", i),
                "group cannot be empty",
            ));
        }
    }

    for (i, group) in changelog.groups.iter().enumerate() {
        if group.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("changelog.groups[{}].name", i),
                "group name cannot be empty",
            ));
        }
    }

    for (i, rule) in changelog.link_parsers.iter().enumerate() {
        if rule.pattern.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "changelog.link_parsers[{}].pattern",
                i
            )));
        }
    }

    Ok(())
}
