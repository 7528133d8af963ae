//! Error types for the fuzzpatch crate.

/// Patch engine error types.
///
/// Matching failures (`InvalidPattern`, `NoOpReplacement`, `NoMatch`,
/// `AmbiguousMatch`) guarantee the original content was left untouched.
/// Operation-level failures are recovered by the applier and aggregated
/// into the final [`crate::patch::ApplyReport`] rather than raised.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// The search pattern was empty.
    #[error("old_string cannot be empty")]
    InvalidPattern,

    /// The search pattern and replacement are identical.
    #[error("old_string and new_string are identical")]
    NoOpReplacement,

    /// No matching strategy located the pattern in the content.
    #[error("could not find a match for old_string in the file")]
    NoMatch,

    /// The winning strategy produced multiple matches without `replace_all`.
    #[error(
        "found {count} matches for old_string; provide more context to make it unique, or use replace_all"
    )]
    AmbiguousMatch { count: usize },

    /// File-operations service failure, tagged with the path involved.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A single patch operation failed, tagged with the file path.
    #[error("error processing {path}: {reason}")]
    Operation { path: String, reason: String },
}

impl PatchError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag an operation-level failure with its file path.
    pub fn operation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Operation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result type for fuzzpatch operations.
pub type PatchResult<T> = Result<T, PatchError>;
