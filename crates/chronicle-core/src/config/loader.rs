//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ConfigError;

use super::defaults::config_file_names;
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.to_path_buf())
        } else {
            ConfigError::Io(e)
        }
    })?;

    let is_toml = path.extension().is_some_and(|e| e == "toml");
    info!(
        path = %path.display(),
        format = if is_toml { "TOML" } else { "YAML" },
        "loading config"
    );
    parse_config(&content, is_toml)
}

/// Parse and validate configuration text
pub fn parse_config(content: &str, is_toml: bool) -> Result<Config, ConfigError> {
    let config: Config = if is_toml {
        toml::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };

    validate_config(&config)?;
    debug!(
        parsers = config.changelog.commit_parsers.len(),
        preprocessors = config.changelog.commit_preprocessors.len(),
        "config loaded and validated"
    );
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks:
///   1. `<dir>/<name>`          (e.g. `chronicle.toml`)
///   2. `<dir>/.github/<name>`  (e.g. `.github/chronicle.toml`)
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf), ConfigError> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults.
///
/// Only a missing file falls back to defaults; a file that exists but fails
/// to parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>), ConfigError> {
    match load_config_from_dir(dir) {
        Ok((config, path)) => Ok((config, Some(path))),
        Err(ConfigError::NotFound(_)) => {
            warn!(dir = %dir.display(), "no config found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.yaml");
        std::fs::write(&config_path, "changelog:\n  format: markdown\n").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_yaml_over_toml() {
        let temp = TempDir::new().unwrap();
        let toml_path = temp.path().join("chronicle.toml");
        let yaml_path = temp.path().join("chronicle.yaml");
        std::fs::write(&toml_path, "[changelog]\nformat = \"markdown\"").unwrap();
        std::fs::write(&yaml_path, "changelog:\n  format: markdown").unwrap();

        let found = find_config(temp.path()).unwrap();
        assert_eq!(found, yaml_path);
    }

    #[test]
    fn test_find_config_in_github_dir() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("chronicle.toml");
        std::fs::write(&config_path, "[changelog]\nformat = \"markdown\"").unwrap();

        let found = find_config(temp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_walks_parents() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.yaml");
        std::fs::write(&config_path, "changelog: {}\n").unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.toml");
        std::fs::write(
            &config_path,
            r#"
[git]
revision = "main"

[changelog]
sort_commits = "newest"
filter_unconventional = false

[[changelog.commit_parsers]]
message = "^feat"
group = "Features"

[[changelog.commit_parsers]]
message = "^chore"
skip = true
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.git.revision, "main");
        assert_eq!(config.changelog.commit_parsers.len(), 2);
        assert!(config.changelog.commit_parsers[1].skip);
        assert!(!config.changelog.filter_unconventional);
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.yaml");
        std::fs::write(
            &config_path,
            "changelog:\n  commit_preprocessors:\n    - pattern: 'foo'\n      replace: 'bar'\n",
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.changelog.commit_preprocessors[0].replace, "bar");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.changelog.format, "markdown");
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("chronicle.yaml"), "changelog: [unclosed").unwrap();
        assert!(load_config_or_default(temp.path()).is_err());
    }
}
