//! Parsed message types

use crate::types::Footer;

/// The `type(scope)!: description` header of a conventional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalHeader {
    /// Commit type, lowercased
    pub commit_type: String,
    /// Scope in parentheses
    pub scope: Option<String>,
    /// Text after the colon
    pub description: String,
    /// `!` marker present
    pub breaking_marker: bool,
}

/// Structured parts of a commit message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParts {
    /// Header, when the first line follows the conventional format
    pub header: Option<ConventionalHeader>,
    /// Body text without footers
    pub body: Option<String>,
    /// Footer fields
    pub footers: Vec<Footer>,
    /// Breaking by marker, footer, or explicit flag
    pub breaking: bool,
}

impl MessageParts {
    /// Conventional scope, if any
    pub fn scope(&self) -> Option<&str> {
        self.header.as_ref().and_then(|h| h.scope.as_deref())
    }

    /// Whether the first line follows the conventional format
    pub fn is_conventional(&self) -> bool {
        self.header.is_some()
    }
}
