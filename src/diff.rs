//! Per-operation diff rendering for the apply report.
//!
//! Update operations get a real unified diff of before/after content;
//! Add and Delete get synthetic stubs, since only one side exists.

use similar::{Algorithm, TextDiff};

/// Unified diff of a file's content before and after patching, with
/// `a/`-`b/` headers. Patience keeps hunks aligned on unchanged lines,
/// which matters for the code-heavy content this crate patches.
pub fn unified_diff(file_name: &str, old: &str, new: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(old, new);

    diff.unified_diff()
        .header(&format!("a/{file_name}"), &format!("b/{file_name}"))
        .to_string()
}

/// Synthetic diff for a newly created file: `/dev/null -> path`.
pub fn added_file_diff(file_name: &str, lines: &[String]) -> String {
    let mut out = format!("--- /dev/null\n+++ b/{file_name}\n");
    for line in lines {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Stub diff noting a file deletion.
pub fn deleted_file_diff(file_name: &str) -> String {
    format!("--- a/{file_name}\n+++ /dev/null\n# File deleted\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_diffs_empty() {
        assert!(unified_diff("lib.rs", "fn f() {}\n", "fn f() {}\n").is_empty());
    }

    #[test]
    fn test_changed_line_shows_both_sides() {
        let before = "use std::io;\n\nfn read() -> u8 { 0 }\n";
        let after = "use std::io;\n\nfn read() -> u8 { 1 }\n";
        let result = unified_diff("reader.rs", before, after);
        assert!(result.contains("--- a/reader.rs"));
        assert!(result.contains("+++ b/reader.rs"));
        assert!(result.contains("-fn read() -> u8 { 0 }"));
        assert!(result.contains("+fn read() -> u8 { 1 }"));
    }

    #[test]
    fn test_added_file_diff() {
        let lines = vec!["hello".to_owned(), "world".to_owned()];
        let result = added_file_diff("a.txt", &lines);
        assert!(result.starts_with("--- /dev/null\n+++ b/a.txt\n"));
        assert!(result.contains("+hello\n+world\n"));
    }

    #[test]
    fn test_deleted_file_diff() {
        let result = deleted_file_diff("gone.rs");
        assert!(result.contains("+++ /dev/null"));
    }
}
