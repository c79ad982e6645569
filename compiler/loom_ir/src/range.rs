//! Document text ranges.
//!
//! Compact 8-byte half-open byte range used for leaf blocks, whitespace gaps,
//! dependent-spacing targets and emitted edits.

use std::fmt;

/// Error when creating a range from offsets that do not fit the document model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Range start position exceeds `u32::MAX`.
    #[error("range start {0} (0x{0:X}) exceeds u32::MAX (0x{max:X})", max = u32::MAX)]
    StartTooLarge(usize),
    /// Range end position exceeds `u32::MAX`.
    #[error("range end {0} (0x{0:X}) exceeds u32::MAX (0x{max:X})", max = u32::MAX)]
    EndTooLarge(usize),
    /// Range end lies before its start.
    #[error("range end {end} lies before start {start}")]
    Inverted { start: usize, end: usize },
}

/// Half-open byte range `[start, end)` in the original document.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from document start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    /// Empty range at offset zero.
    pub const EMPTY: TextRange = TextRange { start: 0, end: 0 };

    /// Create a new range.
    ///
    /// An inverted pair is normalized to the empty range at `start`.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        if end < start {
            TextRange { start, end: start }
        } else {
            TextRange { start, end }
        }
    }

    /// Try to create a range from a byte range.
    #[inline]
    pub fn try_from_range(range: std::ops::Range<usize>) -> Result<Self, RangeError> {
        if range.end < range.start {
            return Err(RangeError::Inverted {
                start: range.start,
                end: range.end,
            });
        }
        let start =
            u32::try_from(range.start).map_err(|_| RangeError::StartTooLarge(range.start))?;
        let end = u32::try_from(range.end).map_err(|_| RangeError::EndTooLarge(range.end))?;
        Ok(TextRange { start, end })
    }

    /// Create a zero-length range.
    #[inline]
    pub const fn point(offset: u32) -> Self {
        TextRange {
            start: offset,
            end: offset,
        }
    }

    /// Length of the range in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the range is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if an offset is within this range.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Check if another range is fully contained within this range.
    #[inline]
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if the two ranges share at least one offset.
    #[inline]
    pub fn intersects(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest range covering both.
    #[inline]
    #[must_use]
    pub fn cover(self, other: TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::TextRange;
    crate::static_assert_size!(TextRange, 8);
}
