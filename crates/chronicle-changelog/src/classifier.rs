//! Commit classification
//!
//! Parser rules are tried in declared order and the first one whose
//! predicates all match decides the outcome. Classification looks at one
//! commit and the rule set only.

use chronicle_git::CommitInfo;

use crate::parser::{CommitParser, MessageParts};
use crate::rules::{ParserRule, Policies, RuleSet};
use crate::types::ParsedCommit;

/// How the governing rule decided a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Filed under the rule's group
    Grouped {
        /// Index of the governing rule
        rule: usize,
    },
    /// Matched a skip rule but kept because it is breaking
    Protected {
        /// Index of the governing rule
        rule: usize,
    },
    /// Matched a skip rule
    Skipped {
        /// Index of the governing rule
        rule: usize,
    },
    /// No rule applies
    Unconventional,
}

impl Outcome {
    /// Index of the governing rule
    pub fn rule(&self) -> Option<usize> {
        match self {
            Self::Grouped { rule } | Self::Protected { rule } | Self::Skipped { rule } => {
                Some(*rule)
            }
            Self::Unconventional => None,
        }
    }
}

/// A classified commit
#[derive(Debug, Clone)]
pub struct Classification {
    /// Rule decision
    pub outcome: Outcome,
    /// The commit as it would be rendered
    pub commit: ParsedCommit,
}

impl Classification {
    /// Whether the commit survives the skip decision and both filter policies.
    ///
    /// A protected commit is always kept, in the ungrouped bucket when its
    /// rule names no group.
    pub fn is_retained(&self, policies: &Policies) -> bool {
        match self.outcome {
            Outcome::Skipped { .. } => false,
            Outcome::Protected { .. } => true,
            Outcome::Unconventional if policies.filter_unconventional => false,
            _ => !(policies.filter_commits && self.commit.group.is_none()),
        }
    }

    /// The commit, when retained
    pub fn into_retained(self, policies: &Policies) -> Option<ParsedCommit> {
        if self.is_retained(policies) {
            Some(self.commit)
        } else {
            None
        }
    }
}

/// Applies parser rules to commits
pub struct CommitClassifier<'a> {
    rules: &'a RuleSet,
    parser: &'a dyn CommitParser,
}

impl<'a> CommitClassifier<'a> {
    /// Create a classifier over a compiled rule set
    pub fn new(rules: &'a RuleSet, parser: &'a dyn CommitParser) -> Self {
        Self { rules, parser }
    }

    /// Classify a single (preprocessed) commit
    pub fn classify(&self, commit: &CommitInfo) -> Classification {
        let parts = self.parser.parse(commit);
        let governing = self
            .rules
            .parsers
            .iter()
            .find_map(|rule| match_rule(rule, commit, &parts).map(|captured| (rule, captured)));

        let Some((rule, captured)) = governing else {
            let scope = parts.scope().map(str::to_string);
            return Classification {
                outcome: Outcome::Unconventional,
                commit: self.build(commit, parts, None, scope),
            };
        };

        let scope = captured
            .or_else(|| parts.scope().map(str::to_string))
            .or_else(|| rule.default_scope.clone());

        let outcome = if !rule.skip {
            Outcome::Grouped { rule: rule.index }
        } else if self.rules.policies.protect_breaking && parts.breaking {
            Outcome::Protected { rule: rule.index }
        } else {
            Outcome::Skipped { rule: rule.index }
        };

        Classification {
            outcome,
            commit: self.build(commit, parts, rule.group.clone(), scope),
        }
    }

    fn build(
        &self,
        commit: &CommitInfo,
        parts: MessageParts,
        group: Option<String>,
        scope: Option<String>,
    ) -> ParsedCommit {
        let links = self.rules.extract_links(&commit.full_message());
        let (commit_type, description) = match parts.header {
            Some(header) => (Some(header.commit_type), header.description),
            None => (None, commit.message.clone()),
        };

        ParsedCommit {
            hash: commit.hash.clone(),
            short_hash: commit.short_hash.clone(),
            message: commit.message.clone(),
            description,
            commit_type,
            scope,
            group,
            breaking: parts.breaking,
            body: parts.body,
            footers: parts.footers,
            links,
            author: commit.author.clone(),
            author_email: commit.author_email.clone(),
            timestamp: commit.timestamp,
        }
    }
}

/// Check every declared predicate; returns the `scope` capture on a match
fn match_rule(rule: &ParserRule, commit: &CommitInfo, parts: &MessageParts) -> Option<Option<String>> {
    let mut captured = None;

    if let Some(pattern) = &rule.message {
        let caps = pattern.captures(&commit.message)?;
        captured = caps.name("scope").map(|m| m.as_str().to_string());
    }

    if let Some(pattern) = &rule.body {
        let caps = pattern.captures(commit.body.as_deref()?)?;
        captured = captured.or_else(|| caps.name("scope").map(|m| m.as_str().to_string()));
    }

    if let Some(pattern) = &rule.scope {
        if !pattern.is_match(parts.scope()?) {
            return None;
        }
    }

    Some(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ConventionalParser;
    use chrono::Utc;
    use chronicle_core::config::{ChangelogConfig, CommitParserConfig};
    use proptest::prelude::*;

    fn rule(message: &str, group: &str) -> CommitParserConfig {
        CommitParserConfig {
            message: Some(message.to_string()),
            group: Some(group.to_string()),
            ..Default::default()
        }
    }

    fn skip(message: &str) -> CommitParserConfig {
        CommitParserConfig {
            message: Some(message.to_string()),
            skip: true,
            ..Default::default()
        }
    }

    fn rules(parsers: Vec<CommitParserConfig>, edit: impl FnOnce(&mut ChangelogConfig)) -> RuleSet {
        let mut config = ChangelogConfig {
            commit_parsers: parsers,
            ..Default::default()
        };
        edit(&mut config);
        RuleSet::load(&config).unwrap()
    }

    fn commit(message: &str) -> CommitInfo {
        CommitInfo::new("abc1234567890", message, "Test", "test@example.com", Utc::now())
    }

    fn classify(rules: &RuleSet, commit: &CommitInfo) -> Classification {
        CommitClassifier::new(rules, &ConventionalParser).classify(commit)
    }

    #[test]
    fn test_features_and_fixes_with_unconventional_filtered() {
        let rules = rules(vec![rule("^feat", "Features"), rule("^fix", "BugFixes")], |c| {
            c.filter_unconventional = true;
        });

        let kept: Vec<_> = ["feat: add X", "fix: bug", "chore: noop"]
            .into_iter()
            .filter_map(|m| classify(&rules, &commit(m)).into_retained(&rules.policies))
            .collect();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].group.as_deref(), Some("Features"));
        assert_eq!(kept[0].message, "feat: add X");
        assert_eq!(kept[1].group.as_deref(), Some("BugFixes"));
    }

    #[test]
    fn test_unconventional_passes_through_ungrouped() {
        let rules = rules(vec![rule("^feat", "Features")], |c| {
            c.filter_unconventional = false;
        });

        let result = classify(&rules, &commit("Update readme"));
        assert_eq!(result.outcome, Outcome::Unconventional);
        assert!(result.commit.group.is_none());
        assert_eq!(result.commit.description, "Update readme");
        assert!(result.is_retained(&rules.policies));
    }

    #[test]
    fn test_filter_commits_drops_ungrouped() {
        let rules = rules(vec![rule("^feat", "Features")], |c| {
            c.filter_unconventional = false;
            c.filter_commits = true;
        });

        assert!(!classify(&rules, &commit("Update readme")).is_retained(&rules.policies));
        assert!(classify(&rules, &commit("feat: x")).is_retained(&rules.policies));
    }

    #[test]
    fn test_skip_wins_over_later_rules() {
        let rules = rules(vec![skip("^chore\\(release\\)"), rule("^chore", "Chores")], |_| {});

        let result = classify(&rules, &commit("chore(release): 1.0.0"));
        assert_eq!(result.outcome, Outcome::Skipped { rule: 0 });
        assert!(!result.is_retained(&rules.policies));
    }

    #[test]
    fn test_protect_breaking_keeps_skipped_commit() {
        let mut skip_with_group = skip("^chore");
        skip_with_group.group = Some("Chores".to_string());
        let rules = rules(vec![skip_with_group, skip("^ci")], |c| {
            c.protect_breaking_commits = true;
        });

        let result = classify(&rules, &commit("chore!: drop node 14"));
        assert_eq!(result.outcome, Outcome::Protected { rule: 0 });
        assert_eq!(result.commit.group.as_deref(), Some("Chores"));
        assert!(result.is_retained(&rules.policies));

        let result = classify(&rules, &commit("ci!: new runners"));
        assert_eq!(result.outcome, Outcome::Protected { rule: 1 });
        assert!(result.commit.group.is_none());
        assert!(result.is_retained(&rules.policies));

        let result = classify(&rules, &commit("chore: tidy"));
        assert_eq!(result.outcome, Outcome::Skipped { rule: 0 });
    }

    #[test]
    fn test_protected_commit_survives_filter_commits() {
        let rules = rules(vec![skip("^chore")], |c| {
            c.protect_breaking_commits = true;
            c.filter_commits = true;
            c.filter_unconventional = false;
        });

        let result = classify(&rules, &commit("chore!: drop node 14"));
        assert_eq!(result.outcome, Outcome::Protected { rule: 0 });
        assert!(result.commit.group.is_none());
        let kept = result.into_retained(&rules.policies).unwrap();
        assert!(kept.breaking);

        assert!(!classify(&rules, &commit("Update readme")).is_retained(&rules.policies));
    }

    #[test]
    fn test_breaking_skip_without_protection() {
        let rules = rules(vec![skip("^chore")], |c| {
            c.protect_breaking_commits = false;
        });
        let result = classify(&rules, &commit("chore!: drop node 14"));
        assert_eq!(result.outcome, Outcome::Skipped { rule: 0 });
    }

    #[test]
    fn test_body_predicate_requires_body() {
        let rules = rules(
            vec![CommitParserConfig {
                body: Some("(?i)security".to_string()),
                group: Some("Security".to_string()),
                ..Default::default()
            }],
            |_| {},
        );

        let with_body = commit("fix: escape input").with_body("Security: XSS in forms");
        assert_eq!(
            classify(&rules, &with_body).commit.group.as_deref(),
            Some("Security")
        );
        assert_eq!(
            classify(&rules, &commit("fix: escape input")).outcome,
            Outcome::Unconventional
        );
    }

    #[test]
    fn test_scope_predicate_and_resolution() {
        let rules = rules(
            vec![
                CommitParserConfig {
                    scope: Some("^api$".to_string()),
                    group: Some("API".to_string()),
                    ..Default::default()
                },
                CommitParserConfig {
                    message: Some("^deps: bump (?P<scope>[a-z-]+)".to_string()),
                    group: Some("Dependencies".to_string()),
                    ..Default::default()
                },
                CommitParserConfig {
                    message: Some("^docs".to_string()),
                    group: Some("Docs".to_string()),
                    default_scope: Some("general".to_string()),
                    ..Default::default()
                },
            ],
            |_| {},
        );

        let api = classify(&rules, &commit("feat(api): add endpoint"));
        assert_eq!(api.commit.group.as_deref(), Some("API"));
        assert_eq!(api.commit.scope.as_deref(), Some("api"));

        let deps = classify(&rules, &commit("deps: bump serde-json to 1.0.100"));
        assert_eq!(deps.commit.scope.as_deref(), Some("serde-json"));

        let docs = classify(&rules, &commit("docs: typo"));
        assert_eq!(docs.commit.scope.as_deref(), Some("general"));

        let scoped_docs = classify(&rules, &commit("docs(cli): usage"));
        assert_eq!(scoped_docs.commit.scope.as_deref(), Some("cli"));
    }

    #[test]
    fn test_links_and_conventional_fields() {
        let rules = rules(vec![rule("^fix", "Fixes")], |c| {
            c.link_parsers.push(chronicle_core::config::LinkParserConfig {
                pattern: "#(\\d+)".to_string(),
                href: "https://example.com/issues/$1".to_string(),
                text: None,
            });
        });

        let result = classify(&rules, &commit("fix(ui): crash on resize (#88)"));
        assert_eq!(result.commit.commit_type.as_deref(), Some("fix"));
        assert_eq!(result.commit.description, "crash on resize (#88)");
        assert_eq!(result.commit.links.len(), 1);
        assert_eq!(result.commit.links[0].text, "#88");
    }

    proptest! {
        #[test]
        fn first_match_wins(message in "[ab]{1,8}") {
            let both = rules(vec![rule("^a", "First"), rule("a", "Second")], |c| {
                c.filter_unconventional = false;
            });
            let first_only = rules(vec![rule("^a", "First")], |c| {
                c.filter_unconventional = false;
            });
            prop_assume!(message.starts_with('a'));

            let c = commit(&message);
            let a = classify(&both, &c);
            let b = classify(&first_only, &c);
            prop_assert_eq!(a.outcome, b.outcome);
            prop_assert_eq!(a.commit.group, b.commit.group);
        }

        #[test]
        fn classification_is_deterministic(message in "(feat|fix|chore|docs)(\\([a-z]{1,5}\\))?!?: [a-z ]{1,20}") {
            let rules = rules(vec![skip("^chore"), rule("^feat", "Features"), rule("^fix", "Fixes")], |c| {
                c.protect_breaking_commits = true;
            });
            let c = commit(&message);
            let first = classify(&rules, &c);
            let second = classify(&rules, &c);
            prop_assert_eq!(first.outcome, second.outcome);
            prop_assert_eq!(first.commit, second.commit);
        }

        #[test]
        fn skipped_commits_are_never_retained(message in "chore[a-z:! ]{0,12}") {
            let rules = rules(vec![skip("^chore"), rule(".*", "Everything")], |c| {
                c.protect_breaking_commits = false;
                c.filter_unconventional = false;
            });
            prop_assert!(!classify(&rules, &commit(&message)).is_retained(&rules.policies));
        }
    }
}
