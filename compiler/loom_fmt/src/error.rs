//! Fatal formatting errors.
//!
//! Conflicting layout rules are never errors; they are resolved by abandoning
//! a rule and reported as diagnostics. The variants here mean the input
//! itself is inconsistent, or the caller asked to stop.

use loom_ir::{TextRange, TreeError};

/// Error that aborts a formatting run without producing edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The block tree violates a structural invariant.
    #[error("invalid block tree: {0}")]
    InvalidTree(#[from] TreeError),
    /// The gap between two consecutive leaves contains non-whitespace text.
    #[error("text between leaves at {range} is not whitespace")]
    NonWhitespaceGap { range: TextRange },
    /// A leaf range lies outside the document or splits a character.
    #[error("leaf range {range} does not fit a document of length {len}")]
    RangeOutOfDocument { range: TextRange, len: u32 },
    /// The cancellation check fired at the start of a pass.
    #[error("formatting cancelled before pass {pass}")]
    Cancelled { pass: u32 },
}
