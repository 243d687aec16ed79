//! Tag segmentation
//!
//! Splits the commit history into releases bounded by tags. Commits are
//! first put in a linear order (by commit date, or by ancestry when
//! topological order is requested), then cut after every commit that
//! carries a surviving tag.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Utc};
use chronicle_git::{CommitInfo, TagInfo};
use tracing::{debug, instrument, warn};

use crate::rules::TagFilters;
use crate::types::ReleaseContext;

/// Position of a commit in the history arena
pub type NodeId = usize;

#[derive(Debug)]
struct Node {
    timestamp: DateTime<Utc>,
    parents: Vec<NodeId>,
}

/// Commit graph as an arena of nodes with parent links
#[derive(Debug, Default)]
pub struct HistoryGraph {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl HistoryGraph {
    /// Build the graph; node ids follow input order.
    ///
    /// Parents outside the given commits are dropped, so a truncated
    /// history still forms a valid graph.
    pub fn build(commits: &[CommitInfo]) -> Self {
        let mut ids = HashMap::with_capacity(commits.len());
        for (id, commit) in commits.iter().enumerate() {
            if ids.insert(commit.hash.clone(), id).is_some() {
                warn!(hash = %commit.hash, "commit appears twice in history");
            }
        }

        let nodes = commits
            .iter()
            .map(|commit| Node {
                timestamp: commit.timestamp,
                parents: commit
                    .parents
                    .iter()
                    .filter_map(|p| ids.get(p).copied())
                    .collect(),
            })
            .collect();

        Self { nodes, ids }
    }

    /// Node of a commit hash
    pub fn node(&self, hash: &str) -> Option<NodeId> {
        self.ids.get(hash).copied()
    }

    /// Number of commits
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no commits
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes by commit date, input order breaking ties
    pub fn chronological(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&id| (self.nodes[id].timestamp, id));
        order
    }

    /// Nodes with every parent before its children.
    ///
    /// Among commits whose parents are all placed, the oldest goes first.
    pub fn topological(&self) -> Vec<NodeId> {
        let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        let mut pending: Vec<usize> = vec![0; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for &parent in &node.parents {
                if parent != id {
                    children[parent].push(id);
                    pending[id] += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<(DateTime<Utc>, NodeId)>> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| Reverse((self.nodes[id].timestamp, id)))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse((_, id))) = ready.pop() {
            order.push(id);
            for &child in &children[id] {
                pending[child] -= 1;
                if pending[child] == 0 {
                    ready.push(Reverse((self.nodes[child].timestamp, child)));
                }
            }
        }

        if order.len() < self.nodes.len() {
            // Only reachable with a cyclic parent list; fall back to dates for the rest
            warn!(
                placed = order.len(),
                total = self.nodes.len(),
                "history has a cycle, ordering remaining commits by date"
            );
            let mut placed = vec![false; self.nodes.len()];
            for &id in &order {
                placed[id] = true;
            }
            order.extend(self.chronological().into_iter().filter(|&id| !placed[id]));
        }

        order
    }
}

/// A contiguous span of commits bounded by tags
#[derive(Debug, Clone)]
pub struct ReleaseSpan {
    /// Boundary tag, `None` for unreleased changes
    pub version: Option<String>,
    /// Timestamp of the boundary commit
    pub timestamp: Option<DateTime<Utc>>,
    /// Boundary commit
    pub commit_id: Option<String>,
    /// Label of the previous release
    pub previous_version: Option<String>,
    /// Tags folded into this span
    pub absorbed_tags: Vec<String>,
    /// Commits, oldest first
    pub commits: Vec<CommitInfo>,
}

impl ReleaseSpan {
    /// Split into an empty release context and the span's commits
    pub fn into_parts(self) -> (ReleaseContext, Vec<CommitInfo>) {
        let release = ReleaseContext {
            version: self.version,
            timestamp: self.timestamp,
            previous_version: self.previous_version,
            commit_id: self.commit_id,
            absorbed_tags: self.absorbed_tags,
            groups: Vec::new(),
            ungrouped: Vec::new(),
        };
        (release, self.commits)
    }
}

#[derive(Debug, Default)]
struct NodeTags {
    boundary: Vec<String>,
    skipped: Vec<String>,
}

/// Partitions history into releases
pub struct TagSegmenter<'a> {
    filters: &'a TagFilters,
    topo_order: bool,
}

impl<'a> TagSegmenter<'a> {
    /// Create a segmenter
    pub fn new(filters: &'a TagFilters, topo_order: bool) -> Self {
        Self {
            filters,
            topo_order,
        }
    }

    /// Partition `commits` into releases, oldest release first.
    ///
    /// Every commit lands in exactly one span. Commits after the last
    /// boundary form an unreleased span.
    #[instrument(skip_all, fields(commits = commits.len(), tags = tags.len(), topo = self.topo_order))]
    pub fn segment(&self, commits: Vec<CommitInfo>, tags: &[TagInfo]) -> Vec<ReleaseSpan> {
        if commits.is_empty() {
            return Vec::new();
        }

        let graph = HistoryGraph::build(&commits);
        let order = if self.topo_order {
            graph.topological()
        } else {
            graph.chronological()
        };
        let tags_by_node = self.assign_tags(&graph, tags);

        let mut slots: Vec<Option<CommitInfo>> = commits.into_iter().map(Some).collect();
        let mut releases = Vec::new();
        let mut current: Vec<CommitInfo> = Vec::new();
        let mut absorbed: Vec<String> = Vec::new();
        let mut previous: Option<String> = None;

        for id in order {
            let Some(commit) = slots[id].take() else {
                continue;
            };
            let boundary = tags_by_node.get(&id).and_then(|node_tags| {
                absorbed.extend(node_tags.skipped.iter().cloned());
                let mut names = node_tags.boundary.iter().cloned();
                let first = names.next();
                absorbed.extend(names);
                first
            });
            let (timestamp, hash) = (commit.timestamp, commit.hash.clone());
            current.push(commit);

            if let Some(version) = boundary {
                debug!(version = %version, commits = current.len(), "release closed");
                releases.push(ReleaseSpan {
                    version: Some(version.clone()),
                    timestamp: Some(timestamp),
                    commit_id: Some(hash),
                    previous_version: previous.replace(version),
                    absorbed_tags: std::mem::take(&mut absorbed),
                    commits: std::mem::take(&mut current),
                });
            }
        }

        if !current.is_empty() {
            debug!(commits = current.len(), "unreleased changes");
            releases.push(ReleaseSpan {
                version: None,
                timestamp: None,
                commit_id: None,
                previous_version: previous,
                absorbed_tags: absorbed,
                commits: current,
            });
        }

        releases
    }

    /// Bucket surviving tags by the node they point at, keeping tag order
    fn assign_tags(&self, graph: &HistoryGraph, tags: &[TagInfo]) -> HashMap<NodeId, NodeTags> {
        let mut by_node: HashMap<NodeId, NodeTags> = HashMap::new();

        for tag in tags {
            if !self.filters.is_release_tag(&tag.name) {
                debug!(tag = %tag.name, "tag does not match tag pattern");
                continue;
            }
            if self.filters.is_ignored(&tag.name) {
                debug!(tag = %tag.name, "tag ignored");
                continue;
            }
            let Some(node) = graph.node(&tag.commit_hash) else {
                warn!(tag = %tag.name, commit = %tag.commit_hash, "tag points at a commit outside the history");
                continue;
            };

            let entry = by_node.entry(node).or_default();
            if self.filters.is_skipped(&tag.name) {
                debug!(tag = %tag.name, "tag skipped, folding into next release");
                entry.skipped.push(tag.name.clone());
            } else {
                entry.boundary.push(tag.name.clone());
            }
        }

        by_node
    }
}
