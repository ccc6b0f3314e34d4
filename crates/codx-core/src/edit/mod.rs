//! Structured edit protocol.
//!
//! LLM responses carry file edits inside fenced code blocks delimited by
//! the literal sentinels `<<<<<<< HEAD`, `=======` and `>>>>>>> updated`;
//! the first non-sentinel line of a block names the target file.
//! [`parse_edits`] extracts them in order and [`apply_edits`] applies them
//! to a workspace, reporting per-edit failures without aborting siblings.

mod applier;
mod parser;

pub use applier::{apply_edit, apply_edits, ApplyReport, ApplySummary, EditError};
pub use parser::parse_edits;

/// A before/after text substitution targeting one file.
///
/// An empty `before` means create-new-file; otherwise `before` must occur
/// verbatim in the current file content for the edit to take effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Target file path, relative to the workspace root.
    pub filename: String,
    /// Text to replace; empty for a new file.
    pub before: String,
    /// Replacement text (or full content of a new file).
    pub after: String,
    /// The raw block the edit was parsed from, for diagnostics.
    pub raw_block: String,
}
