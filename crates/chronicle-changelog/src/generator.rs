//! Changelog generation
//!
//! Wires the stages together: history is segmented into releases, then each
//! release is preprocessed, classified and assembled independently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chronicle_core::config::ChangelogConfig;
use chronicle_core::error::{ChangelogError, ConfigError};
use chronicle_core::ChronicleError;
use chronicle_git::{CommitInfo, TagInfo};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::assembler::ReleaseAssembler;
use crate::classifier::CommitClassifier;
use crate::formatter::{ChangelogFormatter, FormatterRegistry};
use crate::parser::{CommitParser, ConventionalParser};
use crate::preprocess::{preprocess_commit, split_commit};
use crate::rules::RuleSet;
use crate::segmenter::{ReleaseSpan, TagSegmenter};
use crate::types::{ParsedCommit, ReleaseContext};

/// Changelog generator
pub struct ChangelogGenerator {
    rules: RuleSet,
    parser: Box<dyn CommitParser>,
    formatter: Arc<dyn ChangelogFormatter>,
    config: ChangelogConfig,
}

impl ChangelogGenerator {
    /// Compile the configuration and pick the configured formatter
    pub fn new(config: ChangelogConfig) -> Result<Self, ConfigError> {
        let rules = RuleSet::load(&config)?;
        let registry = FormatterRegistry::new();
        let formatter = registry.get(&config.format).ok_or_else(|| {
            ConfigError::invalid(
                "changelog.format",
                format!(
                    "unknown format '{}', expected one of: {}",
                    config.format,
                    registry.names().join(", ")
                ),
            )
        })?;

        Ok(Self {
            rules,
            parser: Box::new(ConventionalParser::new()),
            formatter,
            config,
        })
    }

    /// Use a custom parser
    pub fn with_parser<P: CommitParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Use a custom formatter
    pub fn with_formatter<F: ChangelogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Compiled rules
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Configuration the generator was built from
    pub fn config(&self) -> &ChangelogConfig {
        &self.config
    }

    /// Build every release, oldest first
    pub fn generate(&self, commits: Vec<CommitInfo>, tags: &[TagInfo]) -> Vec<ReleaseContext> {
        let spans = self.segment(commits, tags);
        spans
            .into_par_iter()
            .map(|span| self.process_release(span))
            .collect()
    }

    /// Build every release, checking `cancel` before each release starts
    #[instrument(skip_all, fields(commits = commits.len(), tags = tags.len()))]
    pub fn generate_with_cancel(
        &self,
        commits: Vec<CommitInfo>,
        tags: &[TagInfo],
        cancel: &AtomicBool,
    ) -> Result<Vec<ReleaseContext>, ChangelogError> {
        let spans = self.segment(commits, tags);
        let total = spans.len();

        let results: Vec<Option<ReleaseContext>> = spans
            .into_par_iter()
            .map(|span| {
                if cancel.load(Ordering::Relaxed) {
                    None
                } else {
                    Some(self.process_release(span))
                }
            })
            .collect();

        let completed = results.iter().filter(|r| r.is_some()).count();
        if completed < total {
            info!(completed, total, "changelog generation cancelled");
            return Err(ChangelogError::Cancelled { completed, total });
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn segment(&self, commits: Vec<CommitInfo>, tags: &[TagInfo]) -> Vec<ReleaseSpan> {
        let spans = TagSegmenter::new(&self.rules.tags, self.rules.policies.topo_order)
            .segment(commits, tags);
        info!(releases = spans.len(), "history segmented");
        spans
    }

    /// Preprocess, classify and assemble one release
    #[instrument(skip_all, fields(version = span.version.as_deref().unwrap_or("unreleased")))]
    pub fn process_release(&self, span: ReleaseSpan) -> ReleaseContext {
        let policies = self.rules.policies;
        let (release, commits) = span.into_parts();
        let input = commits.len();

        let commits: Vec<CommitInfo> = if policies.split_commits {
            commits.iter().flat_map(split_commit).collect()
        } else {
            commits
        };
        let commits: Vec<CommitInfo> = commits
            .into_iter()
            .filter(|c| policies.include_merges || !c.is_merge())
            .map(|c| preprocess_commit(c, &self.rules.preprocessors))
            .collect();

        let classifier = CommitClassifier::new(&self.rules, self.parser.as_ref());
        let retained: Vec<ParsedCommit> = commits
            .par_iter()
            .filter_map(|c| classifier.classify(c).into_retained(&policies))
            .collect();

        debug!(
            input,
            classified = commits.len(),
            retained = retained.len(),
            "release classified"
        );

        ReleaseAssembler::new(&self.rules.groups, policies.sort_commits).assemble(release, retained)
    }

    /// Format releases with the configured formatter
    pub fn format(&self, releases: &[ReleaseContext]) -> Result<String, ChronicleError> {
        self.formatter.format(releases, &self.config)
    }

    /// Format releases with different renderer options (header, links, ...)
    pub fn format_with(
        &self,
        releases: &[ReleaseContext],
        config: &ChangelogConfig,
    ) -> Result<String, ChronicleError> {
        self.formatter.format(releases, config)
    }

    /// Generate and format in one step
    #[instrument(skip_all, fields(commits = commits.len()))]
    pub fn generate_formatted(
        &self,
        commits: Vec<CommitInfo>,
        tags: &[TagInfo],
    ) -> Result<String, ChronicleError> {
        let releases = self.generate(commits, tags);
        let output = self.format(&releases)?;
        debug!(output_len = output.len(), "changelog formatted");
        Ok(output)
    }
}
