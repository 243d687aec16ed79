//! Git repository access

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::{debug, info, instrument};

use chronicle_core::error::GitError;

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

/// Read-only git repository wrapper
pub struct GitRepo {
    pub(crate) repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at the given path
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "opening git repository");
        let repo = Repository::open(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::RepositoryNotFound(path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Discover and open a repository by searching parent directories
    #[instrument(fields(start_path = %start_path.display()))]
    pub fn discover(start_path: &Path) -> Result<Self> {
        info!(start_path = %start_path.display(), "discovering git repository");
        let repo = Repository::discover(start_path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                GitError::NotARepository(start_path.to_path_buf())
            } else {
                GitError::OpenFailed(e.to_string())
            }
        })?;

        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a revision (branch, tag, hash, `HEAD~2`, ...) to a commit.
    ///
    /// Returns `Ok(None)` for an unborn `HEAD` so that an empty repository
    /// reads as an empty history.
    pub fn resolve_commit(&self, revision: &str) -> Result<Option<git2::Commit<'_>>> {
        match self.repo.revparse_single(revision) {
            Ok(object) => {
                let commit = object
                    .peel_to_commit()
                    .map_err(|_| GitError::UnknownRevision(revision.to_string()))?;
                Ok(Some(commit))
            }
            Err(e) if revision == "HEAD" && e.code() == git2::ErrorCode::UnbornBranch => {
                debug!("HEAD is unborn, history is empty");
                Ok(None)
            }
            Err(e) if revision == "HEAD" && e.code() == git2::ErrorCode::NotFound => {
                debug!("HEAD has no commits, history is empty");
                Ok(None)
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::UnknownRevision(revision.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }
}
