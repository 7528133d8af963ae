//! Patch operation executor.
//!
//! Runs parsed operations against a [`FileOps`] service in document
//! order. Operations are attempted independently: one failure never
//! aborts the rest, and every failure is collected into the report's
//! combined error text. Hunk application for `Update` operations is
//! delegated to the fuzzy matcher, with a single context-hint windowed
//! retry when direct matching fails.

use std::collections::BTreeMap;
use std::io::ErrorKind;

use tracing::{debug, warn};

use super::parser::parse_patch;
use super::{ApplyReport, Hunk, PatchOperation};
use crate::diff;
use crate::error::{PatchError, PatchResult};
use crate::fileops::FileOps;
use crate::matcher::find_and_replace;

/// Bytes of context searched before a hint occurrence in the fallback
/// window.
const HINT_WINDOW_BEFORE: usize = 500;

/// Bytes of context searched after a hint occurrence.
const HINT_WINDOW_AFTER: usize = 2000;

/// Parse a V4A patch document and apply it through `fs`.
pub fn apply_patch<F: FileOps>(patch: &str, fs: &mut F) -> ApplyReport {
    let operations = parse_patch(patch);
    apply_operations(&operations, fs)
}

/// Apply parsed operations in document order, aggregating a report.
///
/// `success` is true only when every operation succeeded. Lint runs once
/// per modified/created path when the service provides it.
pub fn apply_operations<F: FileOps>(operations: &[PatchOperation], fs: &mut F) -> ApplyReport {
    let mut files_modified = Vec::new();
    let mut files_created = Vec::new();
    let mut files_deleted = Vec::new();
    let mut diffs = Vec::new();
    let mut errors = Vec::new();

    for op in operations {
        let outcome = match op {
            PatchOperation::Add { path, hunks } => apply_add(fs, path, hunks).map(|d| {
                files_created.push(path.clone());
                d
            }),
            PatchOperation::Update { path, hunks } => apply_update(fs, path, hunks).map(|d| {
                files_modified.push(path.clone());
                d
            }),
            PatchOperation::Delete { path } => apply_delete(fs, path).map(|d| {
                files_deleted.push(path.clone());
                d
            }),
            PatchOperation::Move { from, to } => apply_move(fs, from, to).map(|d| {
                files_modified.push(format!("{from} -> {to}"));
                d
            }),
        };

        match outcome {
            Ok(d) => diffs.push(d),
            Err(e) => {
                let tagged = match e {
                    e @ PatchError::Operation { .. } => e,
                    other => PatchError::operation(op.path(), other.to_string()),
                };
                errors.push(tagged.to_string());
            }
        }
    }

    let mut lint = BTreeMap::new();
    for path in files_modified.iter().chain(&files_created) {
        if let Some(outcome) = fs.lint(path) {
            lint.insert(path.clone(), outcome);
        }
    }

    ApplyReport {
        success: errors.is_empty(),
        diff: diffs.join("\n"),
        files_modified,
        files_created,
        files_deleted,
        lint: (!lint.is_empty()).then_some(lint),
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    }
}

fn apply_add<F: FileOps>(fs: &mut F, path: &str, hunks: &[Hunk]) -> PatchResult<String> {
    let lines: Vec<String> = hunks.iter().flat_map(Hunk::added_lines).collect();
    let content = lines.join("\n");
    fs.write_file(path, &content)?;
    Ok(diff::added_file_diff(path, &lines))
}

fn apply_delete<F: FileOps>(fs: &mut F, path: &str) -> PatchResult<String> {
    match fs.remove_file(path) {
        Ok(()) => Ok(diff::deleted_file_diff(path)),
        // A missing target is idempotent success; any other failure
        // (permissions, I/O) must surface.
        Err(PatchError::Io { ref source, .. }) if source.kind() == ErrorKind::NotFound => {
            Ok(format!("# {path} already deleted or doesn't exist"))
        }
        Err(e) => Err(e),
    }
}

fn apply_move<F: FileOps>(fs: &mut F, from: &str, to: &str) -> PatchResult<String> {
    fs.rename_file(from, to)?;
    Ok(format!("# Moved: {from} -> {to}"))
}

fn apply_update<F: FileOps>(fs: &mut F, path: &str, hunks: &[Hunk]) -> PatchResult<String> {
    let original = fs.read_file(path)?;
    let mut content = original.clone();

    for hunk in hunks {
        let pattern = hunk.search_pattern();
        if pattern.is_empty() {
            // A pure-insertion hunk has nothing to anchor on; the format
            // gives us no position to splice at, so the hunk is dropped.
            warn!(path, "skipping hunk with no context or removed lines");
            continue;
        }
        let replacement = hunk.replacement();

        match find_and_replace(&content, &pattern, &replacement, false) {
            Ok((patched, _)) => content = patched,
            Err(e) => {
                content = retry_near_hint(&content, hunk, &pattern, &replacement)
                    .ok_or_else(|| {
                        PatchError::operation(path, format!("could not apply hunk: {e}"))
                    })?;
                debug!(path, "hunk applied via context-hint window");
            }
        }
    }

    fs.write_file(path, &content)?;
    Ok(diff::unified_diff(path, &original, &content))
}

/// Locate the hunk's context hint in the partially-patched content and
/// re-run the matcher restricted to a window around it, splicing the
/// window's result back in on success.
fn retry_near_hint(content: &str, hunk: &Hunk, pattern: &str, replacement: &str) -> Option<String> {
    let hint = hunk.context_hint.as_deref()?;
    let hint_pos = content.find(hint)?;

    let start = floor_char_boundary(content, hint_pos.saturating_sub(HINT_WINDOW_BEFORE));
    let end = ceil_char_boundary(content, hint_pos + HINT_WINDOW_AFTER);

    let (patched, _) = find_and_replace(&content[start..end], pattern, replacement, false).ok()?;

    let mut result = String::with_capacity(content.len() + patched.len());
    result.push_str(&content[..start]);
    result.push_str(&patched);
    result.push_str(&content[end..]);
    Some(result)
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileops::LintOutcome;
    use indoc::indoc;

    /// In-memory file-operations fake.
    #[derive(Default)]
    struct MemFs {
        files: BTreeMap<String, String>,
        lint_enabled: bool,
        deny_removal: bool,
    }

    impl MemFs {
        fn with(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(p, c)| ((*p).to_owned(), (*c).to_owned()))
                    .collect(),
                ..Self::default()
            }
        }

        fn missing(path: &str) -> PatchError {
            PatchError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            )
        }
    }

    impl FileOps for MemFs {
        fn read_file(&mut self, path: &str) -> PatchResult<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| Self::missing(path))
        }

        fn write_file(&mut self, path: &str, content: &str) -> PatchResult<()> {
            self.files.insert(path.to_owned(), content.to_owned());
            Ok(())
        }

        fn remove_file(&mut self, path: &str) -> PatchResult<()> {
            if self.deny_removal {
                return Err(PatchError::io(
                    path,
                    std::io::Error::new(ErrorKind::PermissionDenied, "removal denied"),
                ));
            }
            self.files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| Self::missing(path))
        }

        fn rename_file(&mut self, from: &str, to: &str) -> PatchResult<()> {
            let content = self.files.remove(from).ok_or_else(|| Self::missing(from))?;
            self.files.insert(to.to_owned(), content);
            Ok(())
        }

        fn lint(&mut self, path: &str) -> Option<LintOutcome> {
            self.lint_enabled.then(|| LintOutcome {
                ok: true,
                messages: vec![format!("{path}: clean")],
            })
        }
    }

    #[test]
    fn test_add_roundtrip() {
        let mut fs = MemFs::default();
        let report = apply_patch(
            indoc! {"
                *** Begin Patch
                *** Add File: a.txt
                +hello
                +world
                *** End Patch
            "},
            &mut fs,
        );
        assert!(report.success);
        assert_eq!(fs.files["a.txt"], "hello\nworld");
        assert_eq!(report.files_created, vec!["a.txt"]);
        assert!(report.diff.contains("+++ b/a.txt"));
    }

    #[test]
    fn test_update_replaces_via_matcher() {
        let mut fs = MemFs::with(&[("main.rs", "fn main() {\n    old();\n}\n")]);
        let report = apply_patch(
            indoc! {"
                *** Update File: main.rs
                 fn main() {
                -    old();
                +    new();
                 }
            "},
            &mut fs,
        );
        assert!(report.success, "error: {:?}", report.error);
        assert_eq!(fs.files["main.rs"], "fn main() {\n    new();\n}\n");
        assert!(report.diff.contains("-    old();"));
        assert!(report.diff.contains("+    new();"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut fs = MemFs::default();
        let report = apply_patch("*** Delete File: ghost.rs", &mut fs);
        assert!(report.success);
        assert_eq!(report.files_deleted, vec!["ghost.rs"]);
        assert!(report.diff.contains("already deleted"));
    }

    #[test]
    fn test_delete_failure_other_than_missing_is_reported() {
        // Only a missing target counts as "already deleted"; a removal
        // that fails for any other reason must fail the operation.
        let mut fs = MemFs::with(&[("locked.rs", "content\n")]);
        fs.deny_removal = true;
        let report = apply_patch("*** Delete File: locked.rs", &mut fs);
        assert!(!report.success);
        assert!(report.files_deleted.is_empty());
        assert!(report.error.unwrap().contains("locked.rs"));
        assert!(fs.files.contains_key("locked.rs"));
    }

    #[test]
    fn test_move_then_delete_leaves_neither() {
        let mut fs = MemFs::with(&[("a", "content")]);
        let report = apply_patch(
            indoc! {"
                *** Move File: a -> b
                *** Delete File: b
            "},
            &mut fs,
        );
        assert!(report.success);
        assert!(!fs.files.contains_key("a"));
        assert!(!fs.files.contains_key("b"));
        assert_eq!(report.files_deleted, vec!["b"]);
        assert_eq!(report.files_modified, vec!["a -> b"]);
    }

    #[test]
    fn test_failed_update_does_not_abort_sibling_add() {
        let mut fs = MemFs::with(&[("target.rs", "completely unrelated\n")]);
        let report = apply_patch(
            indoc! {"
                *** Update File: target.rs
                -this text appears nowhere in the file at all
                +replacement
                *** Add File: new.txt
                +still created
            "},
            &mut fs,
        );
        assert!(!report.success);
        assert_eq!(fs.files["new.txt"], "still created");
        assert_eq!(fs.files["target.rs"], "completely unrelated\n");
        let error = report.error.unwrap();
        assert!(error.contains("target.rs"));
        assert!(error.contains("could not apply hunk"));
    }

    #[test]
    fn test_update_missing_file_reports_error() {
        let mut fs = MemFs::default();
        let report = apply_patch("*** Update File: absent.rs\n-a\n+b", &mut fs);
        assert!(!report.success);
        assert!(report.error.unwrap().contains("absent.rs"));
    }

    #[test]
    fn test_sequential_operations_on_same_path_compose() {
        let mut fs = MemFs::with(&[("f.txt", "one\ntwo\n")]);
        let report = apply_patch(
            indoc! {"
                *** Update File: f.txt
                -one
                +uno
                *** Update File: f.txt
                -two
                +dos
            "},
            &mut fs,
        );
        assert!(report.success);
        assert_eq!(fs.files["f.txt"], "uno\ndos\n");
        assert_eq!(report.files_modified, vec!["f.txt", "f.txt"]);
    }

    #[test]
    fn test_hint_window_disambiguates() {
        // "x" is ambiguous across the whole file, but the hint pins the
        // search to a window past the first occurrence.
        let filler = "a".repeat(600);
        let content = format!("x\n{filler}\nANCHOR\nx\ntail\n");
        let mut fs = MemFs::with(&[("f.txt", &content)]);
        let report = apply_patch(
            indoc! {"
                *** Update File: f.txt
                @@ ANCHOR @@
                -x
                +y
            "},
            &mut fs,
        );
        assert!(report.success, "error: {:?}", report.error);
        let result = &fs.files["f.txt"];
        assert!(result.starts_with("x\n"), "first occurrence untouched");
        assert!(result.ends_with("ANCHOR\ny\ntail\n"));
    }

    #[test]
    fn test_hint_miss_still_fails() {
        let mut fs = MemFs::with(&[("f.txt", "x\nx\n")]);
        let report = apply_patch(
            indoc! {"
                *** Update File: f.txt
                @@ NO SUCH ANCHOR @@
                -x
                +y
            "},
            &mut fs,
        );
        assert!(!report.success);
        assert_eq!(fs.files["f.txt"], "x\nx\n");
    }

    #[test]
    fn test_pure_insertion_hunk_skipped() {
        let mut fs = MemFs::with(&[("f.txt", "body\n")]);
        let report = apply_patch(
            indoc! {"
                *** Update File: f.txt
                +floating insertion with no anchor
            "},
            &mut fs,
        );
        assert!(report.success);
        assert_eq!(fs.files["f.txt"], "body\n");
    }

    #[test]
    fn test_lint_collected_for_modified_and_created() {
        let mut fs = MemFs::with(&[("m.rs", "old\n")]);
        fs.lint_enabled = true;
        let report = apply_patch(
            indoc! {"
                *** Update File: m.rs
                -old
                +new
                *** Add File: c.rs
                +fresh
            "},
            &mut fs,
        );
        assert!(report.success);
        let lint = report.lint.unwrap();
        assert!(lint.contains_key("m.rs"));
        assert!(lint.contains_key("c.rs"));
        assert!(lint["m.rs"].ok);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let mut fs = MemFs::default();
        let report = apply_patch("*** Add File: a\n+x", &mut fs);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["files_created"][0], "a");
        assert!(json.get("error").is_none());
    }
}
