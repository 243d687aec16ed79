//! JSON changelog formatter

use chronicle_core::config::ChangelogConfig;
use chronicle_core::Result;
use serde::Serialize;
use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::ReleaseContext;

/// Emits the release contexts as JSON, newest release first
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    /// Pretty-print the output
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a pretty-printing formatter
    pub fn new() -> Self {
        Self { pretty: true }
    }
}

#[derive(Serialize)]
struct Document<'a> {
    releases: Vec<&'a ReleaseContext>,
}

impl ChangelogFormatter for JsonFormatter {
    #[instrument(skip_all, fields(releases = releases.len()))]
    fn format(&self, releases: &[ReleaseContext], _config: &ChangelogConfig) -> Result<String> {
        let document = Document {
            releases: releases.iter().rev().collect(),
        };
        let output = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        debug!(output_len = output.len(), "json changelog formatted");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
