//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Chronicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// History reading configuration
    pub git: GitConfig,

    /// Changelog rules and rendering options
    pub changelog: ChangelogConfig,
}

/// History reading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Revision the history walk starts from
    pub revision: String,

    /// Read at most this many of the most recent commits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_commits: Option<usize>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            revision: "HEAD".to_string(),
            limit_commits: None,
        }
    }
}

/// Changelog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path
    pub file: PathBuf,

    /// Changelog format (markdown, json)
    pub format: String,

    /// Text placed before the first release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Text placed after the last release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    /// Whether to include commit hashes
    pub include_hashes: bool,

    /// Whether to include authors
    pub include_authors: bool,

    /// Whether to include dates
    pub include_dates: bool,

    /// Repository URL used for commit and compare links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    /// Message rewrites applied before classification, in order
    pub commit_preprocessors: Vec<CommitPreprocessorConfig>,

    /// Classification rules, first match wins
    pub commit_parsers: Vec<CommitParserConfig>,

    /// Group declarations with their output priority
    pub groups: Vec<GroupConfig>,

    /// Link extraction rules
    pub link_parsers: Vec<LinkParserConfig>,

    /// Keep breaking commits even when a skip rule matches them
    pub protect_breaking_commits: bool,

    /// Drop commits that no parser rule applies to
    pub filter_unconventional: bool,

    /// Drop commits that end up without a group
    pub filter_commits: bool,

    /// Treat each line of a commit message as its own commit
    pub split_commits: bool,

    /// Keep merge commits
    pub include_merges: bool,

    /// Order of commits inside a group
    pub sort_commits: SortDirection,

    /// Order history by ancestry instead of commit date
    pub topo_order: bool,

    /// Only tags matching this pattern are considered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_pattern: Option<String>,

    /// Tags folded into the next release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_tags: Option<String>,

    /// Tags that are fully transparent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_tags: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        let parser = |message: &str, group: &str| CommitParserConfig {
            message: Some(message.to_string()),
            group: Some(group.to_string()),
            ..Default::default()
        };

        Self {
            file: PathBuf::from("CHANGELOG.md"),
            format: "markdown".to_string(),
            header: Some("# Changelog\n\nAll notable changes to this project will be documented in this file.".to_string()),
            footer: None,
            include_hashes: true,
            include_authors: false,
            include_dates: true,
            repository_url: None,
            commit_preprocessors: Vec::new(),
            commit_parsers: vec![
                parser("^feat", "Features"),
                parser("^fix", "Bug Fixes"),
                parser("^perf", "Performance"),
                parser("^doc", "Documentation"),
                parser("^refactor", "Refactoring"),
                CommitParserConfig {
                    message: Some("^chore\\(release\\)".to_string()),
                    skip: true,
                    ..Default::default()
                },
                parser("^(chore|ci|build|test|style)", "Miscellaneous Tasks"),
            ],
            groups: Vec::new(),
            link_parsers: Vec::new(),
            protect_breaking_commits: false,
            filter_unconventional: true,
            filter_commits: false,
            split_commits: false,
            include_merges: true,
            sort_commits: SortDirection::Oldest,
            topo_order: false,
            tag_pattern: None,
            skip_tags: None,
            ignore_tags: None,
        }
    }
}

/// A message rewrite rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitPreprocessorConfig {
    /// Pattern matched against the message
    pub pattern: String,
    /// Replacement, may reference captures as `$1` or `${1}`
    #[serde(default)]
    pub replace: String,
}

/// A classification rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitParserConfig {
    /// Pattern matched against the commit summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Pattern matched against the commit body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Pattern matched against the conventional scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Group the commit is filed under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Scope used when the commit has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,
    /// Exclude matching commits
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
}

/// A group declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group label as used by parser rules
    pub name: String,
    /// Position key, lower sorts first. Declaration order breaks ties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<SortKey>,
}

/// Sort key of a group; integers sort before strings
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    /// Numeric key
    Integer(i64),
    /// Lexicographic key
    Text(String),
}

/// A link extraction rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkParserConfig {
    /// Pattern matched against the message
    pub pattern: String,
    /// Link target, may reference captures
    pub href: String,
    /// Link text, may reference captures; defaults to the matched text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Ordering of commits within a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Newest commit first
    Newest,
    /// Oldest commit first
    #[default]
    Oldest,
}
