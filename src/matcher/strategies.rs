//! The eight matching strategies of the cascade.
//!
//! Each strategy takes `(content, pattern)` and returns zero or more
//! byte ranges into the original `content`. Strategies are stateless and
//! reentrant; the orchestrator in `mod.rs` owns ordering, uniqueness,
//! and replacement.

use super::remap::PositionMap;
use super::similarity;
use super::{normalize_blank_runs, MatchRange};

/// Minimum middle-lines similarity for a block-anchor window.
const BLOCK_ANCHOR_SIMILARITY: f64 = 0.70;

/// Per-line similarity counted as "matching" by the context-aware
/// strategy.
const CONTEXT_LINE_SIMILARITY: f64 = 0.80;

/// Fraction of matching line pairs a context-aware window needs.
const CONTEXT_MATCH_FRACTION: f64 = 0.5;

// ---------------------------------------------------------------------------
// Strategy 1: exact
// ---------------------------------------------------------------------------

/// Literal substring search; all occurrences found by repeated scan
/// from one char past each hit. Overlapping hits are filtered by the
/// orchestrator.
pub fn exact(content: &str, pattern: &str) -> Vec<MatchRange> {
    if pattern.is_empty() {
        // `find("")` matches everywhere; an empty pattern is meaningless
        // and would walk the scan off the end of the buffer.
        return Vec::new();
    }

    let mut results = Vec::new();
    let mut from = 0;

    while let Some(pos) = content[from..].find(pattern) {
        let start = from + pos;
        results.push(MatchRange::new(start, start + pattern.len()));
        // Advance one full char so the scan terminates on empty-adjacent
        // repeats without splitting a multi-byte boundary.
        from = start
            + content[start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
    }

    results
}

// ---------------------------------------------------------------------------
// Strategy 2: line_trimmed
// ---------------------------------------------------------------------------

/// Compare with leading/trailing whitespace stripped from every line of
/// both content and pattern. A match spans exactly the pattern's line
/// count in the original content.
pub fn line_trimmed(content: &str, pattern: &str) -> Vec<MatchRange> {
    windows_matching_normalized_lines(content, pattern, str::trim)
}

// ---------------------------------------------------------------------------
// Strategy 3: whitespace_normalized
// ---------------------------------------------------------------------------

/// Collapse space/tab runs to a single space in both buffers, search the
/// normalized forms exactly, then remap offsets back to the original via
/// the lock-step position map.
pub fn whitespace_normalized(content: &str, pattern: &str) -> Vec<MatchRange> {
    let norm_content = normalize_blank_runs(content);
    let norm_pattern = normalize_blank_runs(pattern);

    let found = exact(&norm_content, &norm_pattern);
    if found.is_empty() {
        return Vec::new();
    }

    let map = PositionMap::build(content, &norm_content);
    found.into_iter().map(|r| map.to_original(r)).collect()
}

// ---------------------------------------------------------------------------
// Strategy 4: indentation_flexible
// ---------------------------------------------------------------------------

/// Strip only leading whitespace per line; otherwise identical to the
/// line-trimmed block logic.
pub fn indentation_flexible(content: &str, pattern: &str) -> Vec<MatchRange> {
    windows_matching_normalized_lines(content, pattern, str::trim_start)
}

// ---------------------------------------------------------------------------
// Strategy 5: escape_normalized
// ---------------------------------------------------------------------------

/// Decode literal `\n`/`\t`/`\r` escape sequences in the pattern only,
/// then delegate to exact. Skipped entirely when the pattern contains no
/// such sequences, so it can never shadow an earlier strategy's verdict.
pub fn escape_normalized(content: &str, pattern: &str) -> Vec<MatchRange> {
    let unescaped = pattern
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\r", "\r");

    if unescaped == pattern {
        return Vec::new();
    }

    exact(content, &unescaped)
}

// ---------------------------------------------------------------------------
// Strategy 6: trimmed_boundary
// ---------------------------------------------------------------------------

/// Trim whitespace only on the pattern's first and last lines, interior
/// lines untouched. Every content window of the pattern's line count is
/// trimmed the same way and accepted on equality.
pub fn trimmed_boundary(content: &str, pattern: &str) -> Vec<MatchRange> {
    let pattern_lines: Vec<&str> = pattern.split('\n').collect();
    let content_lines: Vec<&str> = content.split('\n').collect();
    let count = pattern_lines.len();

    if count > content_lines.len() {
        return Vec::new();
    }

    let starts = line_starts(&content_lines);
    let mut results = Vec::new();

    for i in 0..=content_lines.len() - count {
        let window = &content_lines[i..i + count];
        let matches = (0..count).all(|j| {
            if j == 0 || j + 1 == count {
                window[j].trim() == pattern_lines[j].trim()
            } else {
                window[j] == pattern_lines[j]
            }
        });
        if matches {
            results.push(block_range(&starts, i, count, content.len()));
        }
    }

    results
}

// ---------------------------------------------------------------------------
// Strategy 7: block_anchor
// ---------------------------------------------------------------------------

/// Anchor on the pattern's first and last trimmed lines; accept a window
/// when the middle lines reach the similarity threshold. Requires a
/// pattern of at least two lines; middle similarity is 1.0 when there
/// are no middle lines to compare.
pub fn block_anchor(content: &str, pattern: &str) -> Vec<MatchRange> {
    let pattern_lines: Vec<&str> = pattern.split('\n').collect();
    if pattern_lines.len() < 2 {
        return Vec::new();
    }

    let content_lines: Vec<&str> = content.split('\n').collect();
    let count = pattern_lines.len();
    if count > content_lines.len() {
        return Vec::new();
    }

    let first = pattern_lines[0].trim();
    let last = pattern_lines[count - 1].trim();
    let pattern_middle = pattern_lines[1..count - 1].join("\n");

    let starts = line_starts(&content_lines);
    let mut results = Vec::new();

    for i in 0..=content_lines.len() - count {
        if content_lines[i].trim() != first || content_lines[i + count - 1].trim() != last {
            continue;
        }

        let sim = if count <= 2 {
            1.0
        } else {
            let window_middle = content_lines[i + 1..i + count - 1].join("\n");
            similarity::ratio(&window_middle, &pattern_middle)
        };

        if sim >= BLOCK_ANCHOR_SIMILARITY {
            results.push(block_range(&starts, i, count, content.len()));
        }
    }

    results
}

// ---------------------------------------------------------------------------
// Strategy 8: context_aware
// ---------------------------------------------------------------------------

/// The most permissive strategy: accept a window when at least half of
/// its line pairs have per-line (trimmed) similarity ≥ 0.80.
pub fn context_aware(content: &str, pattern: &str) -> Vec<MatchRange> {
    let pattern_lines: Vec<&str> = pattern.split('\n').collect();
    let content_lines: Vec<&str> = content.split('\n').collect();
    let count = pattern_lines.len();

    if count > content_lines.len() {
        return Vec::new();
    }

    let starts = line_starts(&content_lines);
    let mut results = Vec::new();

    for i in 0..=content_lines.len() - count {
        let similar_pairs = pattern_lines
            .iter()
            .zip(&content_lines[i..i + count])
            .filter(|(p, c)| similarity::ratio(p.trim(), c.trim()) >= CONTEXT_LINE_SIMILARITY)
            .count();

        if similar_pairs as f64 >= count as f64 * CONTEXT_MATCH_FRACTION {
            results.push(block_range(&starts, i, count, content.len()));
        }
    }

    results
}

// ---------------------------------------------------------------------------
// Shared block/window helpers
// ---------------------------------------------------------------------------

/// Byte offset of each line's first byte, one entry per line.
fn line_starts(lines: &[&str]) -> Vec<usize> {
    let mut starts = Vec::with_capacity(lines.len());
    let mut offset = 0;
    for line in lines {
        starts.push(offset);
        offset += line.len() + 1; // +1 for the \n separator
    }
    starts
}

/// Byte range of the window starting at line `i` spanning `count` lines,
/// excluding the trailing newline (or clamped to the buffer end for the
/// final line).
fn block_range(starts: &[usize], i: usize, count: usize, content_len: usize) -> MatchRange {
    let start = starts[i];
    let end = if i + count < starts.len() {
        starts[i + count] - 1
    } else {
        content_len
    };
    MatchRange::new(start, end)
}

/// Slide a window of the pattern's line count over the content,
/// comparing lines after applying `normalize` to each line of both
/// sides. Shared by the line-trimmed and indentation-flexible
/// strategies.
fn windows_matching_normalized_lines(
    content: &str,
    pattern: &str,
    normalize: fn(&str) -> &str,
) -> Vec<MatchRange> {
    let content_lines: Vec<&str> = content.split('\n').collect();
    let pattern_lines: Vec<&str> = pattern.split('\n').map(normalize).collect();
    let count = pattern_lines.len();

    if count > content_lines.len() {
        return Vec::new();
    }

    let normalized_content: Vec<&str> = content_lines.iter().map(|l| normalize(l)).collect();
    let starts = line_starts(&content_lines);
    let mut results = Vec::new();

    for i in 0..=content_lines.len() - count {
        if normalized_content[i..i + count] == pattern_lines[..] {
            results.push(block_range(&starts, i, count, content.len()));
        }
    }

    results
}

// ===========================================================================
// Tests
// ===========================================================================
