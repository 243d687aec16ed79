//! Commit message rewriting
//!
//! Preprocessors run before classification. The rewritten text replaces the
//! original for every later stage.

use chronicle_git::CommitInfo;

use crate::rules::CommitPreprocessor;

/// Apply every rule in order, each to the output of the previous one.
///
/// A rule replaces all non-overlapping matches. Rules that do not match
/// leave the text untouched.
pub fn rewrite_message(message: &str, rules: &[CommitPreprocessor]) -> String {
    rules.iter().fold(message.to_string(), |text, rule| {
        if rule.pattern.is_match(&text) {
            rule.pattern
                .replace_all(&text, rule.replace.as_str())
                .into_owned()
        } else {
            text
        }
    })
}

/// Rewrite a commit's full message and split it back into summary and body
pub fn preprocess_commit(mut commit: CommitInfo, rules: &[CommitPreprocessor]) -> CommitInfo {
    if rules.is_empty() {
        return commit;
    }

    let rewritten = rewrite_message(&commit.full_message(), rules);
    let (summary, body) = match rewritten.split_once('\n') {
        Some((summary, body)) => (summary, body.trim_start_matches(['\r', '\n'])),
        None => (rewritten.as_str(), ""),
    };

    commit.message = summary.trim_end().to_string();
    commit.with_body(body)
}

/// Turn every non-empty line of a message into its own commit.
///
/// The copies share the original's hash, timestamp and parents.
pub fn split_commit(commit: &CommitInfo) -> Vec<CommitInfo> {
    commit
        .full_message()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut part = commit.clone();
            part.message = line.to_string();
            part.body = None;
            part
        })
        .collect()
}
