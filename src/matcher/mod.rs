//! Fuzzy find-and-replace engine.
//!
//! A cascade of eight matching strategies is tried in a fixed priority
//! order, from literal substring search down to similarity-scored window
//! matching. Each strategy is a pure function `(content, pattern) ->
//! Vec<MatchRange>` returning byte ranges into the **original** content;
//! strategies that search a normalized copy remap their offsets before
//! returning (see [`remap`]). The first strategy producing at least one
//! match wins — later strategies are never consulted, even if the winner
//! subsequently fails the uniqueness check.
//!
//! # Strategies
//!
//! 1. `exact` — literal substring search
//! 2. `line_trimmed` — trim each line before comparing
//! 3. `whitespace_normalized` — collapse space/tab runs, remap offsets
//! 4. `indentation_flexible` — strip leading whitespace per line
//! 5. `escape_normalized` — decode `\n`/`\t`/`\r` literals in the pattern
//! 6. `trimmed_boundary` — trim only the pattern's first/last lines
//! 7. `block_anchor` — first/last line anchors + middle similarity ≥ 0.70
//! 8. `context_aware` — ≥ 50 % of line pairs with similarity ≥ 0.80

pub mod remap;
pub mod similarity;
pub mod strategies;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::PatchError;

/// Half-open byte range into a specific content buffer.
///
/// Invariant: `0 <= start <= end <= content.len()`, both offsets on char
/// boundaries of the buffer they were produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

impl MatchRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The ranges produced by the winning strategy of one cascade run.
#[derive(Debug)]
pub struct StrategyMatch {
    /// Name of the strategy that produced the ranges.
    pub strategy: &'static str,
    /// Non-overlapping match ranges, ascending by start offset.
    pub ranges: Vec<MatchRange>,
}

/// A matching strategy: pure function from `(content, pattern)` to
/// candidate byte ranges in `content`.
type Strategy = fn(&str, &str) -> Vec<MatchRange>;

/// The ordered cascade. Order is part of the contract: permissive
/// strategies must never shadow stricter ones.
const STRATEGY_CASCADE: &[(&str, Strategy)] = &[
    ("exact", strategies::exact),
    ("line_trimmed", strategies::line_trimmed),
    ("whitespace_normalized", strategies::whitespace_normalized),
    ("indentation_flexible", strategies::indentation_flexible),
    ("escape_normalized", strategies::escape_normalized),
    ("trimmed_boundary", strategies::trimmed_boundary),
    ("block_anchor", strategies::block_anchor),
    ("context_aware", strategies::context_aware),
];

#[allow(clippy::unwrap_used)] // pattern is a compile-time literal
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// Collapse runs of spaces and tabs to a single space, preserving
/// newlines. Shared by the whitespace-normalized strategy and the
/// position remapper.
pub(crate) fn normalize_blank_runs(s: &str) -> String {
    BLANK_RUNS.replace_all(s, " ").into_owned()
}

/// Run the cascade and return the first strategy's matches, if any.
///
/// An empty pattern never matches. Returned ranges are clamped to
/// `content.len()` and filtered so no two overlap (earlier starts win).
pub fn find_matches(content: &str, pattern: &str) -> Option<StrategyMatch> {
    if pattern.is_empty() {
        return None;
    }

    for &(name, strategy) in STRATEGY_CASCADE {
        let mut ranges = strategy(content, pattern);
        if ranges.is_empty() {
            continue;
        }

        for r in &mut ranges {
            r.end = r.end.min(content.len());
        }
        ranges.sort_by_key(|r| r.start);

        // Overlapping candidate windows are excluded before counting.
        let mut kept: Vec<MatchRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            if kept.last().is_none_or(|prev| r.start >= prev.end) {
                kept.push(r);
            }
        }

        debug!(strategy = name, matches = kept.len(), "strategy matched");
        return Some(StrategyMatch {
            strategy: name,
            ranges: kept,
        });
    }

    None
}

/// Find `old` in `content` using the strategy cascade and replace it
/// with `new`.
///
/// Returns the new content and the number of replacements performed.
/// Without `replace_all` the winning strategy must yield exactly one
/// match; otherwise [`PatchError::AmbiguousMatch`] is returned and the
/// content is left untouched. With `replace_all` every match is
/// substituted, from the highest start offset down so earlier offsets
/// stay valid.
///
/// # Errors
///
/// [`PatchError::InvalidPattern`] for an empty `old`,
/// [`PatchError::NoOpReplacement`] when `old == new`,
/// [`PatchError::NoMatch`] when no strategy succeeds, and
/// [`PatchError::AmbiguousMatch`] as described above.
pub fn find_and_replace(
    content: &str,
    old: &str,
    new: &str,
    replace_all: bool,
) -> Result<(String, usize), PatchError> {
    if old.is_empty() {
        return Err(PatchError::InvalidPattern);
    }
    if old == new {
        return Err(PatchError::NoOpReplacement);
    }

    let Some(found) = find_matches(content, old) else {
        return Err(PatchError::NoMatch);
    };

    if found.ranges.len() > 1 && !replace_all {
        return Err(PatchError::AmbiguousMatch {
            count: found.ranges.len(),
        });
    }

    debug!(
        strategy = found.strategy,
        count = found.ranges.len(),
        "performing replacement"
    );

    let count = found.ranges.len();
    let mut result = content.to_owned();
    for r in found.ranges.into_iter().rev() {
        result.replace_range(r.start..r.end, new);
    }

    Ok((result, count))
}
