//! Error codes for formatter diagnostics.

use std::fmt;

/// Error codes for all formatter diagnostics.
///
/// Format: F#### where the first digit indicates the resolver:
/// - F0xxx: Alignment resolution
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    /// Alignment rollbacks exceeded the number of leaves
    F0001,
    /// Backward shift would undo the shift that caused it
    F0002,
}

impl ErrorCode {
    /// All error code variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[ErrorCode::F0001, ErrorCode::F0002];

    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::F0001 => "F0001",
            ErrorCode::F0002 => "F0002",
        }
    }

    /// Short description used as the default message.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::F0001 => "alignment cycle detected",
            ErrorCode::F0002 => "recursive backward alignment",
        }
    }

    /// Check if this code comes from the alignment resolver.
    pub fn is_alignment_error(&self) -> bool {
        self.as_str().starts_with("F0")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
