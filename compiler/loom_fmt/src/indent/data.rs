//! Resolved indent value.

use std::ops::Add;

/// Column of a line start, split into its structural indent and its
/// alignment remainder.
///
/// Only the indent part may render as tabs; the remainder is always spaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndentData {
    pub indent_spaces: u32,
    pub spaces: u32,
}

impl IndentData {
    #[inline]
    pub const fn new(indent_spaces: u32, spaces: u32) -> Self {
        IndentData {
            indent_spaces,
            spaces,
        }
    }

    /// Total column.
    #[inline]
    pub const fn total(self) -> u32 {
        self.indent_spaces + self.spaces
    }

    /// Add `n` columns of structural indent.
    #[inline]
    #[must_use = "indent returns a new IndentData"]
    pub const fn indent(self, n: u32) -> Self {
        IndentData {
            indent_spaces: self.indent_spaces + n,
            ..self
        }
    }

    /// Add `n` columns of alignment remainder.
    #[inline]
    #[must_use = "align returns a new IndentData"]
    pub const fn align(self, n: u32) -> Self {
        IndentData {
            spaces: self.spaces + n,
            ..self
        }
    }
}

impl Add for IndentData {
    type Output = IndentData;

    fn add(self, rhs: IndentData) -> IndentData {
        IndentData {
            indent_spaces: self.indent_spaces + rhs.indent_spaces,
            spaces: self.spaces + rhs.spaces,
        }
    }
}
