//! V4A patch documents: data model, parser, and applier.
//!
//! The V4A format is the line-oriented patch dialect used by codex,
//! cline, and related coding agents:
//!
//! ```text
//! *** Begin Patch
//! *** Update File: path/to/file.py
//! @@ optional context hint @@
//!  context line
//! -removed line
//! +added line
//! *** Add File: path/to/new.py
//! +new file content
//! *** Delete File: path/to/old.py
//! *** Move File: old/path.py -> new/path.py
//! *** End Patch
//! ```
//!
//! [`parser::parse_patch`] turns a document into [`PatchOperation`]s;
//! [`apply::apply_operations`] executes them against a
//! [`crate::fileops::FileOps`] service, delegating hunk application to
//! the fuzzy matcher.

pub mod apply;
pub mod parser;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::fileops::LintOutcome;

/// A single tagged line within a hunk. Ordering within the hunk is
/// significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Removed(String),
    Added(String),
}

/// A contiguous block of context/added/removed lines within one file's
/// patch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    /// Free-text annotation from the `@@ ... @@` header, used only as a
    /// fallback anchor when direct matching fails.
    pub context_hint: Option<String>,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// The text this hunk searches for: Context + Removed lines, joined.
    pub fn search_pattern(&self) -> String {
        let lines: Vec<&str> = self
            .lines
            .iter()
            .filter_map(|l| match l {
                HunkLine::Context(s) | HunkLine::Removed(s) => Some(s.as_str()),
                HunkLine::Added(_) => None,
            })
            .collect();
        lines.join("\n")
    }

    /// The text this hunk substitutes in: Context + Added lines, joined.
    pub fn replacement(&self) -> String {
        let lines: Vec<&str> = self
            .lines
            .iter()
            .filter_map(|l| match l {
                HunkLine::Context(s) | HunkLine::Added(s) => Some(s.as_str()),
                HunkLine::Removed(_) => None,
            })
            .collect();
        lines.join("\n")
    }

    /// Contents of the Added lines only (new-file content).
    pub fn added_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|l| match l {
                HunkLine::Added(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

/// One operation of a patch document, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    /// Create a file from the `+` lines of the single implicit hunk.
    Add { path: String, hunks: Vec<Hunk> },
    /// Apply hunks to an existing file through the fuzzy matcher.
    Update { path: String, hunks: Vec<Hunk> },
    /// Remove a file (idempotent: a missing target is a no-op success).
    Delete { path: String },
    /// Rename a file.
    Move { from: String, to: String },
}

impl PatchOperation {
    /// The path this operation is reported under.
    pub fn path(&self) -> &str {
        match self {
            Self::Add { path, .. } | Self::Update { path, .. } | Self::Delete { path } => path,
            Self::Move { from, .. } => from,
        }
    }
}

/// Aggregate result of applying a patch document.
///
/// Constructed once per apply call and immutable afterwards. `success`
/// is true only when every operation succeeded; individual failures are
/// collected into `error`, never dropped.
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub success: bool,
    /// Concatenation of per-operation unified diffs.
    pub diff: String,
    pub files_modified: Vec<String>,
    pub files_created: Vec<String>,
    pub files_deleted: Vec<String>,
    /// Per-file lint results, when the file-operations service lints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<BTreeMap<String, LintOutcome>>,
    /// Combined error text of all failed operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(lines: Vec<HunkLine>) -> Hunk {
        Hunk {
            context_hint: None,
            lines,
        }
    }

    #[test]
    fn test_search_pattern_is_context_plus_removed() {
        let h = hunk(vec![
            HunkLine::Context("a".into()),
            HunkLine::Removed("b".into()),
            HunkLine::Added("c".into()),
            HunkLine::Context("d".into()),
        ]);
        assert_eq!(h.search_pattern(), "a\nb\nd");
    }

    #[test]
    fn test_replacement_is_context_plus_added() {
        let h = hunk(vec![
            HunkLine::Context("a".into()),
            HunkLine::Removed("b".into()),
            HunkLine::Added("c".into()),
            HunkLine::Context("d".into()),
        ]);
        assert_eq!(h.replacement(), "a\nc\nd");
    }

    #[test]
    fn test_pure_addition_hunk_has_empty_search_pattern() {
        let h = hunk(vec![HunkLine::Added("new".into())]);
        assert_eq!(h.search_pattern(), "");
        assert_eq!(h.replacement(), "new");
    }
}
