//! `fuzzpatch` — fuzzy find-and-replace engine and V4A patch applier.
//!
//! LLM-generated edits rarely reproduce file content byte-for-byte:
//! whitespace drifts, escapes get double-encoded, line boundaries shift.
//! This crate makes such edits land anyway, in two halves:
//!
//! - [`matcher`] — a fuzzy find-and-replace engine that locates an "old"
//!   text block under a cascade of eight increasingly permissive
//!   matching strategies, with strict uniqueness and offset-validity
//!   guarantees.
//! - [`patch`] — a parser and applier for the V4A patch format
//!   (`*** Update File:` / `*** Add File:` / `*** Delete File:` /
//!   `*** Move File:`), executing each operation through an injected
//!   [`fileops::FileOps`] service and reporting per-operation unified
//!   diffs.
//!
//! # Control flow
//!
//! ```text
//! patch text → parser → applier → (per hunk) matcher → strategies/remap
//!                           ↓
//!                   FileOps service (injected)
//! ```
//!
//! Everything is synchronous and stateless across calls: concurrent
//! applies are safe as long as each targets its own `FileOps` session.

pub mod diff;
pub mod error;
pub mod fileops;
pub mod matcher;
pub mod patch;

pub use error::{PatchError, PatchResult};
pub use fileops::{FileOps, LintOutcome, WorkspaceFs};
pub use matcher::{find_and_replace, find_matches, MatchRange, StrategyMatch};
pub use patch::apply::{apply_operations, apply_patch};
pub use patch::parser::parse_patch;
pub use patch::{ApplyReport, Hunk, HunkLine, PatchOperation};
