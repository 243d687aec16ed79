//! Commit history reading

use chrono::{TimeZone, Utc};
use git2::Sort;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::CommitInfo;

/// What part of history to read
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Revision the walk starts from
    pub revision: String,
    /// Keep only the most recent N commits
    pub limit: Option<usize>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            revision: "HEAD".to_string(),
            limit: None,
        }
    }
}

impl HistoryOptions {
    /// Start the walk at a specific revision
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Read at most `limit` commits
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

impl GitRepo {
    /// Read history reachable from the configured revision.
    ///
    /// Commits are returned oldest first, with parent links, so the
    /// changelog core can segment them in chronological order.
    #[instrument(skip(self), fields(revision = %options.revision, limit = ?options.limit))]
    pub fn history(&self, options: &HistoryOptions) -> Result<Vec<CommitInfo>> {
        let Some(start) = self.resolve_commit(&options.revision)? else {
            return Ok(Vec::new());
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(start.id())?;

        let limit = options.limit.unwrap_or(usize::MAX);
        let mut commits = Vec::new();

        for oid in revwalk.take(limit) {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(commit_to_info(&commit));
        }

        commits.reverse();
        debug!(count = commits.len(), "read commit history");
        Ok(commits)
    }
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let author = commit.author();

    let message = commit.summary().unwrap_or("(no message)").to_string();

    let timestamp = Utc
        .timestamp_opt(author.when().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    CommitInfo::new(
        commit.id().to_string(),
        message,
        author.name().unwrap_or("Unknown"),
        author.email().unwrap_or("unknown@example.com"),
        timestamp,
    )
    .with_body(commit.body().unwrap_or_default())
    .with_parents(commit.parent_ids().map(|id| id.to_string()))
}
