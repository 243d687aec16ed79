//! Compiled changelog rules
//!
//! A [`RuleSet`] is built once from [`ChangelogConfig`] and is read-only
//! afterwards. Every pattern is compiled here, so later stages never
//! re-validate configuration.

use std::collections::HashMap;

use chronicle_core::config::{ChangelogConfig, SortDirection, SortKey};
use chronicle_core::error::ConfigError;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::types::Link;

/// A message rewrite rule
#[derive(Debug, Clone)]
pub struct CommitPreprocessor {
    /// Pattern matched anywhere in the message
    pub pattern: Regex,
    /// Replacement template with `$n` / `${n}` capture references
    pub replace: String,
}

/// A classification rule; absent patterns match anything
#[derive(Debug, Clone)]
pub struct ParserRule {
    /// Position in the configured rule list
    pub index: usize,
    /// Pattern for the first line of the message
    pub message: Option<Regex>,
    /// Pattern for the body
    pub body: Option<Regex>,
    /// Pattern for the conventional scope
    pub scope: Option<Regex>,
    /// Group label assigned on match
    pub group: Option<String>,
    /// Scope used when none was captured
    pub default_scope: Option<String>,
    /// Exclude matching commits
    pub skip: bool,
}

/// A link extraction rule
#[derive(Debug, Clone)]
pub struct LinkParser {
    /// Pattern matched against the message
    pub pattern: Regex,
    /// Link target template
    pub href: String,
    /// Link text template, the whole match when absent
    pub text: Option<String>,
}

impl LinkParser {
    /// Extract every link this rule finds in `text`
    pub fn extract(&self, text: &str) -> Vec<Link> {
        self.pattern
            .captures_iter(text)
            .map(|caps| {
                let mut href = String::new();
                caps.expand(&self.href, &mut href);
                let text = match &self.text {
                    Some(template) => {
                        let mut text = String::new();
                        caps.expand(template, &mut text);
                        text
                    }
                    None => caps[0].to_string(),
                };
                Link { text, href }
            })
            .collect()
    }
}

/// Tag selection patterns
#[derive(Debug, Clone, Default)]
pub struct TagFilters {
    /// Only matching tags are release candidates
    pub pattern: Option<Regex>,
    /// Matching tags are folded into the next release
    pub skip: Option<Regex>,
    /// Matching tags are fully transparent
    pub ignore: Option<Regex>,
}

impl TagFilters {
    /// Whether a tag is a release candidate at all
    pub fn is_release_tag(&self, name: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| p.is_match(name))
    }

    /// Whether a tag is folded into the next release
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.as_ref().is_some_and(|p| p.is_match(name))
    }

    /// Whether a tag is transparent
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.as_ref().is_some_and(|p| p.is_match(name))
    }
}

/// Scalar policies threaded through classification and assembly
#[derive(Debug, Clone, Copy)]
pub struct Policies {
    /// Retain skipped commits that are breaking
    pub protect_breaking: bool,
    /// Drop commits no rule applies to
    pub filter_unconventional: bool,
    /// Drop commits left without a group
    pub filter_commits: bool,
    /// One commit per message line
    pub split_commits: bool,
    /// Keep merge commits
    pub include_merges: bool,
    /// Commit order inside a group
    pub sort_commits: SortDirection,
    /// Order history by ancestry
    pub topo_order: bool,
}

impl Policies {
    fn from_config(config: &ChangelogConfig) -> Self {
        Self {
            protect_breaking: config.protect_breaking_commits,
            filter_unconventional: config.filter_unconventional,
            filter_commits: config.filter_commits,
            split_commits: config.split_commits,
            include_merges: config.include_merges,
            sort_commits: config.sort_commits,
            topo_order: config.topo_order,
        }
    }
}

/// Output priority of group labels.
///
/// Declared groups come first, ordered by sort key with declaration order
/// breaking ties (groups without a key follow the keyed ones). Labels that
/// parser rules use without declaring them follow in rule order.
#[derive(Debug, Clone, Default)]
pub struct GroupOrder {
    positions: HashMap<String, usize>,
}

impl GroupOrder {
    fn build(config: &ChangelogConfig) -> Self {
        let mut declared: Vec<(Option<&SortKey>, usize, &str)> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (index, group) in config.groups.iter().enumerate() {
            if let Some(first) = seen.get(group.name.as_str()) {
                warn!(
                    group = %group.name,
                    first = first,
                    duplicate = index,
                    "group declared more than once, keeping the first declaration"
                );
                continue;
            }
            seen.insert(group.name.as_str(), index);
            declared.push((group.sort_key.as_ref(), index, group.name.as_str()));
        }

        declared.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(y).then(a.1.cmp(&b.1)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        let mut positions: HashMap<String, usize> = declared
            .iter()
            .enumerate()
            .map(|(pos, (_, _, name))| (name.to_string(), pos))
            .collect();

        for label in config.commit_parsers.iter().filter_map(|p| p.group.as_deref()) {
            let next = positions.len();
            positions.entry(label.to_string()).or_insert(next);
        }

        Self { positions }
    }

    /// Priority of a label; unknown labels sort last
    pub fn position(&self, label: &str) -> usize {
        self.positions.get(label).copied().unwrap_or(usize::MAX)
    }

    /// Number of known labels
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no label is known
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Immutable, ordered rules compiled from configuration
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Rewrites, all applied in order
    pub preprocessors: Vec<CommitPreprocessor>,
    /// Classification rules, first match wins
    pub parsers: Vec<ParserRule>,
    /// Link extraction rules
    pub link_parsers: Vec<LinkParser>,
    /// Group output priority
    pub groups: GroupOrder,
    /// Tag selection patterns
    pub tags: TagFilters,
    /// Scalar policies
    pub policies: Policies,
}

impl RuleSet {
    /// Compile the changelog configuration into rules.
    ///
    /// Fails with the config path of the first offending rule.
    #[instrument(skip(config), fields(parsers = config.commit_parsers.len()))]
    pub fn load(config: &ChangelogConfig) -> Result<Self, ConfigError> {
        let preprocessors = config
            .commit_preprocessors
            .iter()
            .enumerate()
            .map(|(i, rule)| -> Result<CommitPreprocessor, ConfigError> {
                Ok(CommitPreprocessor {
                    pattern: compile(
                        &format!("changelog.commit_preprocessors[{}].pattern", i),
                        &rule.pattern,
                    )?,
                    replace: rule.replace.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let parsers = config
            .commit_parsers
            .iter()
            .enumerate()
            .map(|(i, rule)| -> Result<ParserRule, ConfigError> {
                let field = |name: &str| format!("changelog.commit_parsers[{}].{}", i, name);

                if !rule.skip && rule.group.is_none() {
                    return Err(ConfigError::invalid(
                        format!("changelog.commit_parsers[{}]", i),
                        "rule must declare a group or set skip",
                    ));
                }
                if rule.skip && rule.group.is_some() {
                    debug!(
                        rule = i,
                        "skip rule names a group, used only for protected breaking commits"
                    );
                }

                Ok(ParserRule {
                    index: i,
                    message: compile_opt(&field("message"), rule.message.as_deref())?,
                    body: compile_opt(&field("body"), rule.body.as_deref())?,
                    scope: compile_opt(&field("scope"), rule.scope.as_deref())?,
                    group: rule.group.clone(),
                    default_scope: rule.default_scope.clone(),
                    skip: rule.skip,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let link_parsers = config
            .link_parsers
            .iter()
            .enumerate()
            .map(|(i, rule)| -> Result<LinkParser, ConfigError> {
                Ok(LinkParser {
                    pattern: compile(
                        &format!("changelog.link_parsers[{}].pattern", i),
                        &rule.pattern,
                    )?,
                    href: rule.href.clone(),
                    text: rule.text.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let tags = TagFilters {
            pattern: compile_opt("changelog.tag_pattern", config.tag_pattern.as_deref())?,
            skip: compile_opt("changelog.skip_tags", config.skip_tags.as_deref())?,
            ignore: compile_opt("changelog.ignore_tags", config.ignore_tags.as_deref())?,
        };

        let rules = Self {
            preprocessors,
            parsers,
            link_parsers,
            groups: GroupOrder::build(config),
            tags,
            policies: Policies::from_config(config),
        };

        info!(
            preprocessors = rules.preprocessors.len(),
            parsers = rules.parsers.len(),
            link_parsers = rules.link_parsers.len(),
            groups = rules.groups.len(),
            "rule set compiled"
        );
        Ok(rules)
    }

    /// Extract links from a message with every link rule, in rule order
    pub fn extract_links(&self, text: &str) -> Vec<Link> {
        self.link_parsers
            .iter()
            .flat_map(|parser| parser.extract(text))
            .collect()
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn compile_opt(field: &str, pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern.map(|p| compile(field, p)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::config::{
        CommitParserConfig, CommitPreprocessorConfig, GroupConfig, LinkParserConfig,
    };

    fn parser(message: &str, group: &str) -> CommitParserConfig {
        CommitParserConfig {
            message: Some(message.to_string()),
            group: Some(group.to_string()),
            ..Default::default()
        }
    }

    fn config_with(parsers: Vec<CommitParserConfig>) -> ChangelogConfig {
        ChangelogConfig {
            commit_parsers: parsers,
            ..Default::default()
        }
    }

    #[test]
    fn test_load_preserves_rule_order() {
        let config = config_with(vec![parser("^feat", "Features"), parser("^fix", "Fixes")]);
        let rules = RuleSet::load(&config).unwrap();
        assert_eq!(rules.parsers.len(), 2);
        assert_eq!(rules.parsers[0].group.as_deref(), Some("Features"));
        assert_eq!(rules.parsers[1].index, 1);
    }

    #[test]
    fn test_bad_pattern_names_rule() {
        let config = config_with(vec![parser("^feat", "Features"), parser("(", "Broken")]);
        let err = RuleSet::load(&config).unwrap_err();
        assert_eq!(err.field(), Some("changelog.commit_parsers[1].message"));
    }

    #[test]
    fn test_bad_preprocessor_pattern() {
        let mut config = ChangelogConfig::default();
        config.commit_preprocessors.push(CommitPreprocessorConfig {
            pattern: "[".to_string(),
            replace: String::new(),
        });
        let err = RuleSet::load(&config).unwrap_err();
        assert_eq!(err.field(), Some("changelog.commit_preprocessors[0].pattern"));
    }

    #[test]
    fn test_bad_tag_pattern() {
        let mut config = ChangelogConfig::default();
        config.skip_tags = Some("v(".to_string());
        let err = RuleSet::load(&config).unwrap_err();
        assert_eq!(err.field(), Some("changelog.skip_tags"));
    }

    #[test]
    fn test_rule_without_outcome_fails() {
        let config = config_with(vec![
            parser("^feat", "Features"),
            CommitParserConfig {
                message: Some("^x".to_string()),
                ..Default::default()
            },
        ]);
        let err = RuleSet::load(&config).unwrap_err();
        assert_eq!(err.field(), Some("changelog.commit_parsers[1]"));
    }

    #[test]
    fn test_group_order_declared_then_rule_order() {
        let mut config = config_with(vec![
            parser("^fix", "Fixes"),
            parser("^docs", "Docs"),
            parser("^feat", "Features"),
        ]);
        config.groups = vec![
            GroupConfig {
                name: "Fixes".to_string(),
                sort_key: Some(SortKey::Integer(2)),
            },
            GroupConfig {
                name: "Features".to_string(),
                sort_key: Some(SortKey::Integer(1)),
            },
        ];

        let rules = RuleSet::load(&config).unwrap();
        assert_eq!(rules.groups.position("Features"), 0);
        assert_eq!(rules.groups.position("Fixes"), 1);
        assert_eq!(rules.groups.position("Docs"), 2);
        assert_eq!(rules.groups.position("Unknown"), usize::MAX);
    }

    #[test]
    fn test_group_order_ties_use_declaration_order() {
        let mut config = config_with(vec![]);
        config.groups = vec![
            GroupConfig {
                name: "B".to_string(),
                sort_key: Some(SortKey::Integer(1)),
            },
            GroupConfig {
                name: "A".to_string(),
                sort_key: Some(SortKey::Integer(1)),
            },
            GroupConfig {
                name: "Unkeyed".to_string(),
                sort_key: None,
            },
            GroupConfig {
                name: "B".to_string(),
                sort_key: Some(SortKey::Integer(0)),
            },
        ];

        let rules = RuleSet::load(&config).unwrap();
        assert_eq!(rules.groups.position("B"), 0);
        assert_eq!(rules.groups.position("A"), 1);
        assert_eq!(rules.groups.position("Unkeyed"), 2);
    }

    #[test]
    fn test_tag_filters() {
        let mut config = ChangelogConfig::default();
        config.tag_pattern = Some("^v".to_string());
        config.skip_tags = Some("beta".to_string());
        config.ignore_tags = Some("rc".to_string());
        let rules = RuleSet::load(&config).unwrap();

        assert!(rules.tags.is_release_tag("v1.0.0"));
        assert!(!rules.tags.is_release_tag("nightly"));
        assert!(rules.tags.is_skipped("v1.0.0-beta.1"));
        assert!(rules.tags.is_ignored("v1.0.0-rc.1"));
        assert!(!rules.tags.is_ignored("v1.0.0"));
    }

    #[test]
    fn test_link_extraction() {
        let mut config = ChangelogConfig::default();
        config.link_parsers.push(LinkParserConfig {
            pattern: "#(\\d+)".to_string(),
            href: "https://example.com/issues/$1".to_string(),
            text: Some("issue ${1}".to_string()),
        });
        let rules = RuleSet::load(&config).unwrap();

        let links = rules.extract_links("fix: crash (#12, #15)");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "https://example.com/issues/12");
        assert_eq!(links[1].text, "issue 15");
    }
}
