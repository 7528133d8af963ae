//! Position remapping between normalized and original text.
//!
//! The whitespace-normalized strategy searches inside a copy of the
//! content with space/tab runs collapsed, so match offsets it finds are
//! meaningless in the original buffer. [`PositionMap`] walks the original
//! and normalized buffers in lock-step, recording a monotonic
//! original→normalized index where every byte of a consumed whitespace
//! run maps to the single normalized position it collapsed into, and
//! uses that index to translate normalized match ranges back into
//! original byte offsets.
//!
//! The mapping is byte-level: collapsing only ever touches ASCII space
//! and tab, so multi-byte characters stay in lock-step and translated
//! offsets always land on char boundaries.

use super::MatchRange;

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Monotonic byte-offset map from a normalized buffer back to the
/// original it was derived from.
pub struct PositionMap {
    /// `orig_to_norm[i]` = normalized byte position that original byte
    /// `i` contributed to.
    orig_to_norm: Vec<usize>,
    orig_len: usize,
    norm_len: usize,
}

impl PositionMap {
    /// Build the map by walking `original` and `normalized` in lock-step.
    ///
    /// `normalized` must be `original` with `[ \t]+` runs collapsed to a
    /// single space; any other relationship degrades to a best-effort
    /// forward mapping.
    pub fn build(original: &str, normalized: &str) -> Self {
        let orig = original.as_bytes();
        let norm = normalized.as_bytes();

        let mut orig_to_norm = Vec::with_capacity(orig.len());
        let mut o = 0;
        let mut n = 0;

        while o < orig.len() && n < norm.len() {
            if is_blank(orig[o]) && norm[n] == b' ' {
                // Whitespace run collapsing into this normalized space:
                // every byte of the run maps here, and the normalized
                // cursor only moves once the run is fully consumed.
                orig_to_norm.push(n);
                o += 1;
                if o < orig.len() && !is_blank(orig[o]) {
                    n += 1;
                }
            } else if orig[o] == norm[n] {
                orig_to_norm.push(n);
                o += 1;
                n += 1;
            } else {
                // Whitespace in the original with no normalized
                // counterpart (e.g. a trailing run already consumed), or
                // a divergence the caller's normalization introduced.
                orig_to_norm.push(n);
                o += 1;
            }
        }

        while o < orig.len() {
            orig_to_norm.push(norm.len());
            o += 1;
        }

        Self {
            orig_to_norm,
            orig_len: orig.len(),
            norm_len: norm.len(),
        }
    }

    /// Translate a match range in the normalized buffer to a byte range
    /// in the original.
    pub fn to_original(&self, range: MatchRange) -> MatchRange {
        let start = self
            .orig_to_norm
            .iter()
            .position(|&n| n >= range.start)
            .unwrap_or(self.orig_len);

        let end = if range.end > range.start && range.end <= self.norm_len {
            // Last original byte that contributed to the final normalized
            // position of the match.
            self.orig_to_norm
                .iter()
                .rposition(|&n| n == range.end - 1)
                .map_or(start + (range.end - range.start), |last| last + 1)
        } else {
            start + (range.end - range.start)
        };

        MatchRange::new(start, end.min(self.orig_len))
    }
}
