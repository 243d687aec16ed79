//! Changelog types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit after preprocessing and classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Commit hash
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Rewritten first line of the message
    pub message: String,
    /// Conventional description, or the whole first line
    pub description: String,
    /// Conventional type (feat, fix, etc.) when the message has one
    pub commit_type: Option<String>,
    /// Scope attached during classification
    pub scope: Option<String>,
    /// Group the commit is filed under
    pub group: Option<String>,
    /// Whether this is a breaking change
    pub breaking: bool,
    /// Commit body with footers removed
    pub body: Option<String>,
    /// Footer fields
    pub footers: Vec<Footer>,
    /// Links extracted from the message
    pub links: Vec<Link>,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

/// A footer field such as `Refs: #12` or `Fixes #3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    /// Footer token (e.g., "BREAKING CHANGE", "Fixes", "Refs")
    pub token: String,
    /// Separator between token and value (`": "` or `" #"`)
    pub separator: String,
    /// Footer value
    pub value: String,
}

impl Footer {
    /// Whether the footer announces a breaking change
    pub fn is_breaking(&self) -> bool {
        self.token.eq_ignore_ascii_case("BREAKING CHANGE")
            || self.token.eq_ignore_ascii_case("BREAKING-CHANGE")
    }
}

/// A link extracted from a commit message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Text to display
    pub text: String,
    /// Link target
    pub href: String,
}

/// A group of commits in a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Group label
    pub title: String,
    /// Commits in this group, in configured order
    pub commits: Vec<ParsedCommit>,
}

impl Section {
    /// Create a new section
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            commits: Vec::new(),
        }
    }

    /// Add a commit to the section
    pub fn add_commit(&mut self, commit: ParsedCommit) {
        self.commits.push(commit);
    }

    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Everything a renderer needs to produce one release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseContext {
    /// Tag name, `None` for unreleased changes
    pub version: Option<String>,
    /// Timestamp of the tagged commit, `None` for unreleased changes
    pub timestamp: Option<DateTime<Utc>>,
    /// Version of the release before this one
    pub previous_version: Option<String>,
    /// Commit the release tag points at
    pub commit_id: Option<String>,
    /// Skipped tags whose commits were folded into this release
    pub absorbed_tags: Vec<String>,
    /// Groups in priority order
    pub groups: Vec<Section>,
    /// Commits outside any named group
    pub ungrouped: Vec<ParsedCommit>,
}

impl ReleaseContext {
    /// Whether the release is unreleased work
    pub fn is_unreleased(&self) -> bool {
        self.version.is_none()
    }

    /// Check if the release has any commits left
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Section::is_empty) && self.ungrouped.is_empty()
    }

    /// Number of commits in the release
    pub fn commit_count(&self) -> usize {
        self.groups.iter().map(|s| s.commits.len()).sum::<usize>() + self.ungrouped.len()
    }

    /// All commits in rendering order
    pub fn commits(&self) -> impl Iterator<Item = &ParsedCommit> {
        self.groups
            .iter()
            .flat_map(|s| s.commits.iter())
            .chain(self.ungrouped.iter())
    }

    /// Breaking commits in rendering order
    pub fn breaking_changes(&self) -> impl Iterator<Item = &ParsedCommit> {
        self.commits().filter(|c| c.breaking)
    }

    /// Find a group by label
    pub fn group(&self, title: &str) -> Option<&Section> {
        self.groups.iter().find(|s| s.title == title)
    }

    /// Label unreleased work with the version it is about to ship as
    pub fn with_version(mut self, version: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        self.version = Some(version.into());
        self.timestamp = Some(timestamp);
        self
    }
}
