//! V4A patch document parser.
//!
//! A single left-to-right scan over the document's lines with state
//! `(current operation, current hunk)`, both optional. Marker lines are
//! case-sensitive with flexible internal spacing. The scan tolerates a
//! missing `*** Begin Patch` marker (parsing starts at line 0) and a
//! missing `*** End Patch` marker (parsing runs to end of input); lines
//! outside any operation are ignored, which covers the bracketing
//! markers and stray prose around the patch.

use std::sync::LazyLock;

use regex::Regex;

use super::{Hunk, HunkLine, PatchOperation};

struct Markers {
    update: Regex,
    add: Regex,
    delete: Regex,
    mv: Regex,
    end: Regex,
    hint: Regex,
}

#[allow(clippy::unwrap_used)] // patterns are compile-time literals
static MARKERS: LazyLock<Markers> = LazyLock::new(|| Markers {
    update: Regex::new(r"^\*\*\*\s*Update\s+File:\s*(.+)").unwrap(),
    add: Regex::new(r"^\*\*\*\s*Add\s+File:\s*(.+)").unwrap(),
    delete: Regex::new(r"^\*\*\*\s*Delete\s+File:\s*(.+)").unwrap(),
    mv: Regex::new(r"^\*\*\*\s*Move\s+File:\s*(.+?)\s*->\s*(.+)").unwrap(),
    end: Regex::new(r"^\*\*\*\s*End Patch").unwrap(),
    hint: Regex::new(r"^@@\s*(.+?)\s*@@").unwrap(),
});

/// An Add or Update operation still collecting hunks.
struct OpenOperation {
    is_add: bool,
    path: String,
    hunks: Vec<Hunk>,
}

impl OpenOperation {
    fn close(mut self, hunk: Option<Hunk>) -> PatchOperation {
        if let Some(h) = hunk {
            if !h.lines.is_empty() {
                self.hunks.push(h);
            }
        }
        if self.is_add {
            PatchOperation::Add {
                path: self.path,
                hunks: self.hunks,
            }
        } else {
            PatchOperation::Update {
                path: self.path,
                hunks: self.hunks,
            }
        }
    }
}

/// Parse a V4A patch document into its operations, in source order.
///
/// The parser never fails: malformed lines outside an operation are
/// ignored, and unrecognized lines inside one become implicit context.
pub fn parse_patch(input: &str) -> Vec<PatchOperation> {
    let mut operations = Vec::new();
    let mut current_op: Option<OpenOperation> = None;
    let mut current_hunk: Option<Hunk> = None;

    for line in input.split('\n') {
        if let Some(caps) = MARKERS.update.captures(line) {
            if let Some(op) = current_op.take() {
                operations.push(op.close(current_hunk.take()));
            }
            current_op = Some(OpenOperation {
                is_add: false,
                path: caps[1].trim().to_owned(),
                hunks: Vec::new(),
            });
            current_hunk = None;
        } else if let Some(caps) = MARKERS.add.captures(line) {
            if let Some(op) = current_op.take() {
                operations.push(op.close(current_hunk.take()));
            }
            current_op = Some(OpenOperation {
                is_add: true,
                path: caps[1].trim().to_owned(),
                hunks: Vec::new(),
            });
            // Add operations collect every `+` line into one implicit
            // hunk with no header.
            current_hunk = Some(Hunk::default());
        } else if let Some(caps) = MARKERS.delete.captures(line) {
            if let Some(op) = current_op.take() {
                operations.push(op.close(current_hunk.take()));
            }
            operations.push(PatchOperation::Delete {
                path: caps[1].trim().to_owned(),
            });
            current_hunk = None;
        } else if let Some(caps) = MARKERS.mv.captures(line) {
            if let Some(op) = current_op.take() {
                operations.push(op.close(current_hunk.take()));
            }
            operations.push(PatchOperation::Move {
                from: caps[1].trim().to_owned(),
                to: caps[2].trim().to_owned(),
            });
            current_hunk = None;
        } else if MARKERS.end.is_match(line) {
            if let Some(op) = current_op.take() {
                operations.push(op.close(current_hunk.take()));
            }
            break;
        } else if line.starts_with("@@") {
            if let Some(op) = current_op.as_mut() {
                if let Some(h) = current_hunk.take() {
                    if !h.lines.is_empty() {
                        op.hunks.push(h);
                    }
                }
                let hint = MARKERS
                    .hint
                    .captures(line)
                    .map(|caps| caps[1].to_owned());
                current_hunk = Some(Hunk {
                    context_hint: hint,
                    lines: Vec::new(),
                });
            }
        } else if current_op.is_some() && !line.is_empty() {
            let hunk = current_hunk.get_or_insert_with(Hunk::default);
            if let Some(rest) = line.strip_prefix('+') {
                hunk.lines.push(HunkLine::Added(rest.to_owned()));
            } else if let Some(rest) = line.strip_prefix('-') {
                hunk.lines.push(HunkLine::Removed(rest.to_owned()));
            } else if let Some(rest) = line.strip_prefix(' ') {
                hunk.lines.push(HunkLine::Context(rest.to_owned()));
            } else if line.starts_with('\\') {
                // "\ No newline at end of file" marker.
            } else {
                // Implicit context line, prefix left intact.
                hunk.lines.push(HunkLine::Context(line.to_owned()));
            }
        }
    }

    if let Some(op) = current_op.take() {
        operations.push(op.close(current_hunk.take()));
    }

    operations
}
