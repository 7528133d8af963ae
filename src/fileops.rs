//! File-operations service: the injected side-effecting dependency of
//! the patch applier.
//!
//! The engine itself never touches the filesystem directly; every
//! read/write/remove/rename goes through [`FileOps`], so callers can
//! supply a sandboxed session, an in-memory fake, or the on-disk
//! [`WorkspaceFs`] provided here. One `FileOps` value corresponds to one
//! caller task's session; the engine holds no shared state across
//! sessions.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PatchError, PatchResult};

/// Result of an optional lint pass over one modified or created file.
#[derive(Debug, Clone, Serialize)]
pub struct LintOutcome {
    pub ok: bool,
    pub messages: Vec<String>,
}

/// Contract between the patch applier and its file-operations service.
pub trait FileOps {
    fn read_file(&mut self, path: &str) -> PatchResult<String>;

    fn write_file(&mut self, path: &str, content: &str) -> PatchResult<()>;

    fn remove_file(&mut self, path: &str) -> PatchResult<()>;

    fn rename_file(&mut self, from: &str, to: &str) -> PatchResult<()>;

    /// Optional lint pass, invoked once per modified/created path after
    /// a successful apply. The default implementation lints nothing.
    fn lint(&mut self, path: &str) -> Option<LintOutcome> {
        let _ = path;
        None
    }
}

/// On-disk [`FileOps`] rooted at a workspace directory.
///
/// Paths are validated against the workspace boundary (null bytes, `..`
/// traversal, and symlink escapes are rejected) and writes are atomic:
/// content goes to a temp file in the target's directory which is then
/// renamed into place, so a crash never leaves a partial file.
pub struct WorkspaceFs {
    root: PathBuf,
}

impl WorkspaceFs {
    /// Create a workspace-rooted service. The root must exist.
    pub fn new(root: impl Into<PathBuf>) -> PatchResult<Self> {
        let root: PathBuf = root.into();
        let root = root
            .canonicalize()
            .map_err(|e| PatchError::io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// Resolve `path` inside the workspace, rejecting escapes.
    ///
    /// For paths that do not exist yet (write targets), the deepest
    /// existing ancestor is canonicalized and the remaining components
    /// re-joined, so symlinked parents cannot smuggle the target outside
    /// the root.
    fn resolve(&self, path: &str) -> PatchResult<PathBuf> {
        if path.contains('\0') {
            return Err(escape_error(path, "path contains null byte"));
        }

        let raw = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        };

        let resolved = if raw.exists() {
            raw.canonicalize().map_err(|e| PatchError::io(path, e))?
        } else {
            let mut ancestor = raw.clone();
            let mut suffix = Vec::new();
            loop {
                if ancestor.exists() {
                    let mut result =
                        ancestor.canonicalize().map_err(|e| PatchError::io(path, e))?;
                    for part in suffix.iter().rev() {
                        result = result.join(part);
                    }
                    break result;
                }
                match (ancestor.file_name(), ancestor.parent()) {
                    (Some(name), Some(parent)) => {
                        suffix.push(name.to_os_string());
                        ancestor = parent.to_path_buf();
                    }
                    _ => break raw,
                }
            }
        };

        if !resolved.starts_with(&self.root) {
            return Err(escape_error(path, "path escapes workspace boundary"));
        }

        // `..` components survive the non-existing-path join above.
        if resolved
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(escape_error(path, "path escapes workspace boundary"));
        }

        Ok(resolved)
    }
}

fn escape_error(path: &str, reason: &str) -> PatchError {
    PatchError::io(path, io::Error::new(io::ErrorKind::PermissionDenied, reason))
}

/// Write `content` to `path` via a temp file in the same directory plus
/// an atomic rename.
fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "no parent directory")
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl FileOps for WorkspaceFs {
    fn read_file(&mut self, path: &str) -> PatchResult<String> {
        let resolved = self.resolve(path)?;
        std::fs::read_to_string(&resolved).map_err(|e| PatchError::io(path, e))
    }

    fn write_file(&mut self, path: &str, content: &str) -> PatchResult<()> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PatchError::io(path, e))?;
        }
        atomic_write(&resolved, content).map_err(|e| PatchError::io(path, e))
    }

    fn remove_file(&mut self, path: &str) -> PatchResult<()> {
        let resolved = self.resolve(path)?;
        std::fs::remove_file(&resolved).map_err(|e| PatchError::io(path, e))
    }

    fn rename_file(&mut self, from: &str, to: &str) -> PatchResult<()> {
        let resolved_from = self.resolve(from)?;
        let resolved_to = self.resolve(to)?;
        if let Some(parent) = resolved_to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PatchError::io(to, e))?;
        }
        std::fs::rename(&resolved_from, &resolved_to).map_err(|e| PatchError::io(from, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        fs.write_file("nested/dir/file.txt", "hello").unwrap();
        assert_eq!(fs.read_file("nested/dir/file.txt").unwrap(), "hello");
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        let err = fs.write_file("../outside.txt", "x").unwrap_err();
        assert!(matches!(err, PatchError::Io { .. }));
    }

    #[test]
    fn test_null_byte_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        assert!(fs.read_file("a\0b").is_err());
    }

    #[test]
    fn test_rename_moves_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        fs.write_file("a.txt", "body").unwrap();
        fs.rename_file("a.txt", "b.txt").unwrap();
        assert!(fs.read_file("a.txt").is_err());
        assert_eq!(fs.read_file("b.txt").unwrap(), "body");
    }

    #[test]
    fn test_remove_missing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        assert!(fs.remove_file("missing.txt").is_err());
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = WorkspaceFs::new(dir.path()).unwrap();
        fs.write_file("f.txt", "one").unwrap();
        fs.write_file("f.txt", "two").unwrap();
        assert_eq!(fs.read_file("f.txt").unwrap(), "two");
    }
}
