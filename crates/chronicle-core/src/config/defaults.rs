//! Default configuration values

use super::types::Config;

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".chronicle.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".chronicle.toml",
    ]
}

/// Generate default configuration YAML
pub fn default_config_yaml() -> String {
    let config = Config::default();
    serde_yaml::to_string(&config).unwrap_or_else(|_| DEFAULT_CONFIG_TEMPLATE.to_string())
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Chronicle Configuration
# See https://github.com/example/chronicle for documentation

git:
  revision: HEAD

changelog:
  file: CHANGELOG.md
  format: markdown
  header: |
    # Changelog

    All notable changes to this project will be documented in this file.
  include_hashes: true
  include_authors: false
  include_dates: true

  # Rewrites applied to every message before classification, in order.
  commit_preprocessors:
    - pattern: '\(#([0-9]+)\)'
      replace: '(#${1})'

  # Classification rules. The first rule whose patterns all match wins.
  commit_parsers:
    - message: "^feat"
      group: Features
    - message: "^fix"
      group: Bug Fixes
    - message: "^perf"
      group: Performance
    - message: "^doc"
      group: Documentation
    - message: "^refactor"
      group: Refactoring
    - message: '^chore\(release\)'
      skip: true
    - message: "^(chore|ci|build|test|style)"
      group: Miscellaneous Tasks

  groups:
    - name: Features
      sort_key: 0
    - name: Bug Fixes
      sort_key: 1

  protect_breaking_commits: false
  filter_unconventional: true
  filter_commits: false
  split_commits: false
  include_merges: true
  sort_commits: oldest
  topo_order: false
  tag_pattern: '^v[0-9]'
"#;
