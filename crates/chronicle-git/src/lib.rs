//! Chronicle Git - History reader for changelog generation
//!
//! This crate reads commit history (with parent links) and tags from a git
//! repository. It never mutates the repository.

mod commits;
mod repository;
mod tags;
pub mod types;

pub use commits::HistoryOptions;
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, TagInfo};
