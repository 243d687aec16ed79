//! Chronicle Core - Shared foundations for changelog generation
//!
//! This crate provides the configuration model, configuration loading and
//! validation, and the error taxonomy shared by the Chronicle crates.

pub mod config;
pub mod error;

pub use config::{ChangelogConfig, Config, GitConfig};
pub use error::{ChangelogError, ChronicleError, ConfigError, GitError, Result};
