//! Release assembly

use std::cmp::Ordering;

use chronicle_core::config::SortDirection;

use crate::rules::GroupOrder;
use crate::types::{ParsedCommit, ReleaseContext, Section};

/// Groups a release's retained commits and orders them for rendering
pub struct ReleaseAssembler<'a> {
    groups: &'a GroupOrder,
    direction: SortDirection,
}

impl<'a> ReleaseAssembler<'a> {
    /// Create an assembler
    pub fn new(groups: &'a GroupOrder, direction: SortDirection) -> Self {
        Self { groups, direction }
    }

    /// Fill `release` with `commits`, grouped by label.
    ///
    /// Groups follow label priority; commits without a group go to
    /// `ungrouped`. An empty commit list still yields the release.
    pub fn assemble(&self, mut release: ReleaseContext, commits: Vec<ParsedCommit>) -> ReleaseContext {
        let mut sections: Vec<Section> = Vec::new();
        let mut ungrouped = Vec::new();

        for commit in commits {
            let Some(label) = commit.group.clone() else {
                ungrouped.push(commit);
                continue;
            };
            match sections.iter_mut().find(|s| s.title == label) {
                Some(section) => section.add_commit(commit),
                None => {
                    let mut section = Section::new(label);
                    section.add_commit(commit);
                    sections.push(section);
                }
            }
        }

        sections.sort_by_key(|s| self.groups.position(&s.title));
        for section in &mut sections {
            self.sort(&mut section.commits);
        }
        self.sort(&mut ungrouped);

        release.groups = sections;
        release.ungrouped = ungrouped;
        release
    }

    fn sort(&self, commits: &mut [ParsedCommit]) {
        let direction = self.direction;
        commits.sort_by(|a, b| compare(direction, a, b));
    }
}

/// Order by timestamp in `direction`; equal timestamps by hash ascending
fn compare(direction: SortDirection, a: &ParsedCommit, b: &ParsedCommit) -> Ordering {
    let by_time = match direction {
        SortDirection::Oldest => a.timestamp.cmp(&b.timestamp),
        SortDirection::Newest => b.timestamp.cmp(&a.timestamp),
    };
    by_time.then_with(|| a.hash.cmp(&b.hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use crate::types::fixtures::parsed;
    use chronicle_core::config::{ChangelogConfig, CommitParserConfig, GroupConfig, SortKey};
    use proptest::prelude::*;

    fn empty_release() -> ReleaseContext {
        ReleaseContext {
            version: Some("v1.0.0".to_string()),
            timestamp: None,
            previous_version: None,
            commit_id: None,
            absorbed_tags: vec![],
            groups: vec![],
            ungrouped: vec![],
        }
    }

    fn grouped(hash: &str, group: &str, seconds: i64) -> ParsedCommit {
        let mut commit = parsed(hash, hash, seconds);
        commit.group = Some(group.to_string());
        commit
    }

    fn group_order() -> GroupOrder {
        let config = ChangelogConfig {
            commit_parsers: vec![
                CommitParserConfig {
                    message: Some("^docs".to_string()),
                    group: Some("Docs".to_string()),
                    ..Default::default()
                },
                CommitParserConfig {
                    message: Some("^feat".to_string()),
                    group: Some("Features".to_string()),
                    ..Default::default()
                },
            ],
            groups: vec![GroupConfig {
                name: "Features".to_string(),
                sort_key: Some(SortKey::Integer(0)),
            }],
            ..Default::default()
        };
        RuleSet::load(&config).unwrap().groups
    }

    #[test]
    fn test_groups_in_priority_order() {
        let groups = group_order();
        let assembler = ReleaseAssembler::new(&groups, SortDirection::Oldest);

        let release = assembler.assemble(
            empty_release(),
            vec![
                grouped("d1", "Docs", 1),
                parsed("u1", "misc", 2),
                grouped("f1", "Features", 3),
            ],
        );

        let titles: Vec<_> = release.groups.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Features", "Docs"]);
        assert_eq!(release.ungrouped.len(), 1);
        assert_eq!(release.commit_count(), 3);
    }

    #[test]
    fn test_newest_first_ties_by_hash() {
        let groups = group_order();
        let assembler = ReleaseAssembler::new(&groups, SortDirection::Newest);

        let release = assembler.assemble(
            empty_release(),
            vec![
                grouped("b", "Features", 10),
                grouped("c", "Features", 20),
                grouped("a", "Features", 10),
            ],
        );

        let hashes: Vec<_> = release.groups[0].commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_oldest_first() {
        let groups = group_order();
        let assembler = ReleaseAssembler::new(&groups, SortDirection::Oldest);

        let release = assembler.assemble(
            empty_release(),
            vec![grouped("b", "Docs", 20), grouped("a", "Docs", 10)],
        );

        let hashes: Vec<_> = release.groups[0].commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_release_is_emitted() {
        let groups = group_order();
        let release = ReleaseAssembler::new(&groups, SortDirection::Newest).assemble(empty_release(), vec![]);

        assert!(release.is_empty());
        assert_eq!(release.version.as_deref(), Some("v1.0.0"));
    }

    proptest! {
        #[test]
        fn sorting_is_stable_across_runs(
            entries in proptest::collection::vec((0i64..5, "[a-f]{1,3}"), 0..20),
        ) {
            let groups = group_order();
            let assembler = ReleaseAssembler::new(&groups, SortDirection::Newest);
            let commits: Vec<_> = entries
                .iter()
                .map(|(ts, hash)| grouped(hash, "Features", *ts))
                .collect();

            let first = assembler.assemble(empty_release(), commits.clone());
            let mut reversed = commits;
            reversed.reverse();
            let second = assembler.assemble(empty_release(), reversed);

            let order = |r: &ReleaseContext| -> Vec<(i64, String)> {
                r.commits().map(|c| (c.timestamp.timestamp(), c.hash.clone())).collect()
            };
            let expected = order(&first);
            prop_assert_eq!(&expected, &order(&second));
            prop_assert!(expected.windows(2).all(|w| w[0].0 > w[1].0 || (w[0].0 == w[1].0 && w[0].1 <= w[1].1)));
        }
    }
}
