//! Changelog formatters
//!
//! Formatters receive releases oldest first and own all text layout.

mod json;
mod markdown;
mod registry;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use registry::FormatterRegistry;

use chronicle_core::config::ChangelogConfig;
use chronicle_core::Result;

use crate::types::ReleaseContext;

/// Trait for changelog formatters
pub trait ChangelogFormatter: Send + Sync {
    /// Render releases (given oldest first) into a document
    fn format(&self, releases: &[ReleaseContext], config: &ChangelogConfig) -> Result<String>;

    /// Format name used in configuration
    fn name(&self) -> &'static str;

    /// Get the file extension for this format
    fn extension(&self) -> &'static str;
}
