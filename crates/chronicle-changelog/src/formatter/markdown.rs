//! Markdown changelog formatter

use chronicle_core::config::ChangelogConfig;
use chronicle_core::Result;
use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::{ParsedCommit, ReleaseContext};

/// Markdown changelog formatter
pub struct MarkdownFormatter {
    /// Include compare links between versions
    pub include_compare_links: bool,
    /// Render unreleased changes with nothing left after filtering
    pub include_empty_unreleased: bool,
}

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self {
            include_compare_links: true,
            include_empty_unreleased: false,
        }
    }

    fn write_release(&self, out: &mut String, release: &ReleaseContext, config: &ChangelogConfig) {
        match (&release.version, release.timestamp) {
            (Some(version), Some(timestamp)) if config.include_dates => {
                out.push_str(&format!(
                    "## [{}] - {}\n\n",
                    version,
                    timestamp.format("%Y-%m-%d")
                ));
            }
            (Some(version), _) => {
                out.push_str(&format!("## [{}]\n\n", version));
            }
            (None, _) => out.push_str("## [Unreleased]\n\n"),
        }

        let breaking: Vec<_> = release.breaking_changes().collect();
        if !breaking.is_empty() {
            out.push_str("### ⚠ BREAKING CHANGES\n\n");
            for commit in breaking {
                self.write_entry(out, commit, config);
            }
            out.push('\n');
        }

        for section in &release.groups {
            if section.is_empty() {
                continue;
            }
            out.push_str(&format!("### {}\n\n", section.title));
            for commit in &section.commits {
                self.write_entry(out, commit, config);
            }
            out.push('\n');
        }

        if !release.ungrouped.is_empty() {
            for commit in &release.ungrouped {
                self.write_entry(out, commit, config);
            }
            out.push('\n');
        }
    }

    fn write_entry(&self, out: &mut String, commit: &ParsedCommit, config: &ChangelogConfig) {
        out.push_str("- ");
        if let Some(scope) = &commit.scope {
            out.push_str(&format!("**{}:** ", scope));
        }
        out.push_str(&commit.description);

        if config.include_hashes {
            match &config.repository_url {
                Some(url) => out.push_str(&format!(
                    " ([{}]({}/commit/{}))",
                    commit.short_hash,
                    url.trim_end_matches('/'),
                    commit.hash
                )),
                None => out.push_str(&format!(" ({})", commit.short_hash)),
            }
        }

        for link in &commit.links {
            out.push_str(&format!(" [{}]({})", link.text, link.href));
        }

        if config.include_authors {
            out.push_str(&format!(" - {}", commit.author));
        }

        out.push('\n');
    }

    fn write_compare_links(&self, out: &mut String, releases: &[ReleaseContext], url: &str) {
        let url = url.trim_end_matches('/');
        let mut wrote = false;

        for release in releases.iter().rev() {
            let line = match (&release.version, &release.previous_version) {
                (Some(version), Some(previous)) => {
                    format!("[{}]: {}/compare/{}...{}", version, url, previous, version)
                }
                (Some(version), None) => format!("[{}]: {}/releases/tag/{}", version, url, version),
                (None, Some(previous)) => {
                    format!("[Unreleased]: {}/compare/{}...HEAD", url, previous)
                }
                (None, None) => continue,
            };
            out.push_str(&line);
            out.push('\n');
            wrote = true;
        }

        if wrote {
            out.push('\n');
        }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip_all, fields(releases = releases.len()))]
    fn format(&self, releases: &[ReleaseContext], config: &ChangelogConfig) -> Result<String> {
        let mut output = String::new();

        if let Some(header) = &config.header {
            output.push_str(header.trim_end());
            output.push_str("\n\n");
        }

        let rendered: Vec<&ReleaseContext> = releases
            .iter()
            .rev()
            .filter(|r| !(r.is_unreleased() && r.is_empty()) || self.include_empty_unreleased)
            .collect();

        for release in &rendered {
            self.write_release(&mut output, release, config);
        }

        if self.include_compare_links {
            if let Some(url) = &config.repository_url {
                self.write_compare_links(&mut output, releases, url);
            }
        }

        if let Some(footer) = &config.footer {
            output.push_str(footer.trim_end());
            output.push('\n');
        }

        debug!(
            rendered = rendered.len(),
            output_len = output.len(),
            "markdown changelog formatted"
        );
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}
