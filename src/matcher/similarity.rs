//! Levenshtein edit distance and similarity scoring.
//!
//! Used by the block-anchor and context-aware strategies to score how
//! alike a content window is to the search pattern.

/// Maximum character count for Levenshtein inputs.
///
/// Inputs longer than this are rejected with a pessimistic distance
/// estimate to prevent O(m*n) allocation blowup on degenerate patterns.
const MAX_LEVENSHTEIN_INPUT: usize = 10_000;

/// Compute the Levenshtein edit distance between two strings.
///
/// Returns the minimum number of single-character edits (insertions,
/// deletions, substitutions) required to transform `a` into `b`.
///
/// If either input exceeds [`MAX_LEVENSHTEIN_INPUT`] characters, returns
/// `max(m, n)` as a pessimistic upper bound without computing the matrix.
pub fn distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let max_len = m.max(n);

    if m > MAX_LEVENSHTEIN_INPUT || n > MAX_LEVENSHTEIN_INPUT {
        return max_len;
    }

    // Two rows instead of the full matrix for O(min(m,n)) space.
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for (j, slot) in prev.iter_mut().enumerate() {
        *slot = j;
    }

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Similarity ratio between two strings: 0.0 = completely different,
/// 1.0 = identical. Normalized over the longer input's character count.
pub fn ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let dist = distance(a, b);
    1.0 - (dist as f64 / max_len as f64)
}
