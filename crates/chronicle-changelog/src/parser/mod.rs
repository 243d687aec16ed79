//! Commit message parsing

mod conventional;
mod types;

pub use conventional::ConventionalParser;
pub use types::*;

use chronicle_git::CommitInfo;

/// Trait for commit message parsers
pub trait CommitParser: Send + Sync {
    /// Split a (preprocessed) commit into its structured parts.
    ///
    /// Parsing never fails: a message without a recognizable header simply
    /// yields parts with no header.
    fn parse(&self, commit: &CommitInfo) -> MessageParts;
}
