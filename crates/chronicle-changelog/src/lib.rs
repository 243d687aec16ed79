//! Chronicle Changelog - rule-driven changelog generation
//!
//! The pipeline runs in one direction: history is cut into releases by the
//! [`segmenter`], then every release's commits are rewritten by the
//! [`preprocess`] rules, classified by the [`classifier`] and grouped by the
//! [`assembler`]. Formatters turn the resulting [`ReleaseContext`]s into text.

pub mod assembler;
pub mod classifier;
pub mod formatter;
pub mod generator;
pub mod parser;
pub mod preprocess;
pub mod rules;
pub mod segmenter;
pub mod types;

pub use assembler::ReleaseAssembler;
pub use classifier::{Classification, CommitClassifier, Outcome};
pub use formatter::{ChangelogFormatter, FormatterRegistry, JsonFormatter, MarkdownFormatter};
pub use generator::ChangelogGenerator;
pub use parser::{CommitParser, ConventionalParser, MessageParts};
pub use rules::RuleSet;
pub use segmenter::{HistoryGraph, ReleaseSpan, TagSegmenter};
pub use types::{Footer, Link, ParsedCommit, ReleaseContext, Section};
