//! Conventional Commits parser
//!
//! Parses commits following the Conventional Commits specification:
//! https://www.conventionalcommits.org/

use regex::Regex;
use std::sync::LazyLock;

use super::{CommitParser, ConventionalHeader, MessageParts};
use crate::types::Footer;
use chronicle_git::CommitInfo;

/// Regex for parsing conventional commit headers
static CONVENTIONAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<description>.+)$",
    )
    .expect("Invalid regex")
});

/// Regex for parsing footer lines (`Token: value` or `Token #value`)
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<token>BREAKING[ -]CHANGE|[A-Za-z-]+)(?P<sep>: | #)(?P<value>.+)$")
        .expect("Invalid regex")
});

/// Parser for Conventional Commits format
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalParser;

impl ConventionalParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    fn parse_header(&self, message: &str) -> Option<ConventionalHeader> {
        let caps = CONVENTIONAL_REGEX.captures(message.trim_end())?;

        Some(ConventionalHeader {
            commit_type: caps.name("type")?.as_str().to_lowercase(),
            scope: caps.name("scope").map(|m| m.as_str().trim().to_string()),
            description: caps.name("description")?.as_str().trim().to_string(),
            breaking_marker: caps.name("breaking").is_some(),
        })
    }

    /// Parse the body and extract footers
    fn parse_body(&self, body: &str) -> (Option<String>, Vec<Footer>) {
        let mut footers: Vec<Footer> = Vec::new();
        let mut body_lines = Vec::new();
        let mut in_footer = false;

        for line in body.lines() {
            if let Some(caps) = FOOTER_REGEX.captures(line) {
                in_footer = true;
                footers.push(Footer {
                    token: caps["token"].to_string(),
                    separator: caps["sep"].to_string(),
                    value: caps["value"].trim().to_string(),
                });
            } else if in_footer && line.starts_with(' ') {
                // Continuation of previous footer
                if let Some(last) = footers.last_mut() {
                    last.value.push('\n');
                    last.value.push_str(line.trim());
                }
            } else if in_footer && line.trim().is_empty() {
                continue;
            } else {
                // Text after a footer block means the block was prose
                for footer in footers.drain(..) {
                    body_lines.push(format!("{}{}{}", footer.token, footer.separator, footer.value));
                }
                in_footer = false;
                body_lines.push(line.to_string());
            }
        }

        let body_text = body_lines.join("\n").trim().to_string();
        let body_text = if body_text.is_empty() {
            None
        } else {
            Some(body_text)
        };

        (body_text, footers)
    }
}

impl CommitParser for ConventionalParser {
    fn parse(&self, commit: &CommitInfo) -> MessageParts {
        let header = self.parse_header(&commit.message);
        let (body, footers) = match commit.body.as_deref() {
            Some(body) => self.parse_body(body),
            None => (None, Vec::new()),
        };

        let breaking = commit.breaking
            || header.as_ref().is_some_and(|h| h.breaking_marker)
            || footers.iter().any(Footer::is_breaking);

        MessageParts {
            header,
            body,
            footers,
            breaking,
        }
    }
}
