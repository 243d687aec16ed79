//! Exit codes for the CLI

use chronicle_core::{ChronicleError, ConfigError, GitError};

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Pick the exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    match err.downcast_ref::<ChronicleError>() {
        Some(ChronicleError::Config(_)) => CONFIG_ERROR,
        Some(ChronicleError::Git(_)) => GIT_ERROR,
        _ => ERROR,
    }
}
