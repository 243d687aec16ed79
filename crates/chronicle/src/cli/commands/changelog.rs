//! Changelog command

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use tracing::info;

use chronicle_changelog::{ChangelogFormatter, ChangelogGenerator, JsonFormatter, ReleaseContext};
use chronicle_core::config::load_config_or_default;
use chronicle_core::ChangelogError;
use chronicle_git::{GitRepo, HistoryOptions};

use crate::cli::output::{self, path_style};
use crate::cli::{Cli, OutputFormat};

/// Generate the changelog from git history
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    /// Only render changes since the last release
    #[arg(long, conflicts_with = "latest")]
    pub unreleased: bool,

    /// Only render the most recent release
    #[arg(long)]
    pub latest: bool,

    /// Label unreleased changes with the version about to be released
    #[arg(long, value_name = "NAME")]
    pub tag: Option<String>,

    /// Write to file (default: print to stdout)
    #[arg(short, long)]
    pub write: bool,

    /// Output file (defaults to configured changelog file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            unreleased = self.unreleased,
            latest = self.latest,
            tag = ?self.tag,
            write = self.write,
            "executing changelog command"
        );
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;
        if let Some(path) = &config_path {
            info!(path = %path.display(), "configuration loaded");
        }

        let generator = ChangelogGenerator::new(config.changelog.clone())?;
        let repo = GitRepo::discover(&cwd)?;
        let options = HistoryOptions::default()
            .with_revision(&config.git.revision)
            .with_limit(config.git.limit_commits);
        let commits = repo.history(&options)?;
        let tags = repo.tags()?;

        let releases = self.select(generator.generate(commits, &tags));

        let partial = self.unreleased || self.latest;
        let mut render_config = config.changelog.clone();
        if partial {
            render_config.header = None;
            render_config.footer = None;
        }

        let rendered = match cli.format {
            OutputFormat::Json => JsonFormatter::new().format(&releases, &render_config)?,
            OutputFormat::Text => generator.format_with(&releases, &render_config)?,
        };

        if !self.write {
            println!("{}", rendered.trim_end());
            return Ok(());
        }

        let output_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(&config.changelog.file));
        let content = if partial && output_path.exists() {
            let existing = std::fs::read_to_string(&output_path)?;
            prepend(&existing, &rendered, config.changelog.header.as_deref())
        } else {
            rendered
        };
        write_changelog(&output_path, &content)?;

        if !cli.quiet {
            output::success(&format!(
                "Changelog written to {}",
                path_style().apply_to(output_path.display())
            ));
        }

        Ok(())
    }

    /// Apply `--tag`, `--unreleased` and `--latest` to generated releases
    fn select(&self, mut releases: Vec<ReleaseContext>) -> Vec<ReleaseContext> {
        if self.unreleased {
            releases.retain(|r| r.is_unreleased());
        } else if self.latest {
            let latest = releases.into_iter().rev().find(|r| !r.is_unreleased());
            releases = latest.into_iter().collect();
        }

        if let Some(tag) = &self.tag {
            releases = releases
                .into_iter()
                .map(|r| {
                    if r.is_unreleased() {
                        r.with_version(tag.clone(), Utc::now())
                    } else {
                        r
                    }
                })
                .collect();
        }

        releases
    }
}

/// Insert new entries after the header of an existing changelog
fn prepend(existing: &str, entries: &str, header: Option<&str>) -> String {
    let entries = entries.trim_end();
    match header.map(str::trim_end) {
        Some(header) if !header.is_empty() && existing.starts_with(header) => {
            let rest = existing[header.len()..].trim_start_matches('\n');
            format!("{}\n\n{}\n\n{}", header, entries, rest)
        }
        _ => format!("{}\n\n{}", entries, existing),
    }
}

fn write_changelog(path: &Path, content: &str) -> Result<(), ChangelogError> {
    std::fs::write(path, content)
        .map_err(|e| ChangelogError::WriteFailed(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(version: Option<&str>) -> ReleaseContext {
        ReleaseContext {
            version: version.map(str::to_string),
            timestamp: None,
            previous_version: None,
            commit_id: None,
            absorbed_tags: vec![],
            groups: vec![],
            ungrouped: vec![],
        }
    }

    fn command(unreleased: bool, latest: bool, tag: Option<&str>) -> ChangelogCommand {
        ChangelogCommand {
            unreleased,
            latest,
            tag: tag.map(str::to_string),
            write: false,
            output: None,
        }
    }

    #[test]
    fn test_select_latest() {
        let releases = vec![release(Some("v1.0.0")), release(Some("v1.1.0")), release(None)];
        let selected = command(false, true, None).select(releases);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].version.as_deref(), Some("v1.1.0"));
    }

    #[test]
    fn test_select_unreleased_with_tag() {
        let releases = vec![release(Some("v1.0.0")), release(None)];
        let selected = command(true, false, Some("v2.0.0")).select(releases);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].version.as_deref(), Some("v2.0.0"));

        let releases = vec![release(Some("v1.0.0")), release(None)];
        let selected = command(false, false, Some("v2.0.0")).select(releases);
        assert_eq!(selected[1].version.as_deref(), Some("v2.0.0"));
        assert!(selected[1].timestamp.is_some());
    }

    #[test]
    fn test_tag_leaves_tagged_release_alone() {
        let selected = command(false, false, Some("v2.0.0")).select(vec![release(Some("v1.0.0"))]);
        assert_eq!(selected[0].version.as_deref(), Some("v1.0.0"));
    }

    #[test]
    fn test_prepend_after_header() {
        let existing = "# Changelog\n\n## [v1.0.0]\n\n- old\n";
        let merged = prepend(existing, "## [v1.1.0]\n\n- new\n", Some("# Changelog"));
        assert_eq!(
            merged,
            "# Changelog\n\n## [v1.1.0]\n\n- new\n\n## [v1.0.0]\n\n- old\n"
        );
    }

    #[test]
    fn test_prepend_without_header() {
        let merged = prepend("## [v1.0.0]\n", "## [v1.1.0]\n", None);
        assert_eq!(merged, "## [v1.1.0]\n\n## [v1.0.0]\n");
    }

    #[test]
    fn test_write_changelog() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        write_changelog(&path, "# Changelog\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Changelog\n");

        let missing = dir.path().join("missing").join("CHANGELOG.md");
        assert!(matches!(
            write_changelog(&missing, "x"),
            Err(ChangelogError::WriteFailed(_))
        ));
    }
}
