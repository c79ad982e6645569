//! Offset index over the leaves and the line queries built on it.
//!
//! Leaf text never changes during a run, so the index keeps only static
//! facts (ranges, widths, embedded line feeds). Every query that depends on
//! resolved whitespace takes the current whitespace slice as a parameter and
//! reads only that, never text that has not been resolved yet.

use loom_ir::{TextRange, MAX_RIGHT_MARGIN};

use crate::layout::LeafId;
use crate::whitespace::{column_width, WhiteSpace};

/// Static facts about one leaf's text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct LeafText {
    pub(crate) range: TextRange,
    /// Width of the text when it has no line feed.
    pub(crate) width: u32,
    /// Width after the last line feed of a multi-line leaf.
    pub(crate) last_line_width: u32,
    pub(crate) has_line_feed: bool,
}

impl LeafText {
    pub(crate) fn new(range: TextRange, text: &str, tab_size: u32) -> Self {
        let (has_line_feed, last_line) = match text.rfind('\n') {
            Some(pos) => (true, &text[pos + 1..]),
            None => (false, text),
        };
        let last_line_width = column_width(last_line, 0, tab_size);
        LeafText {
            range,
            width: if has_line_feed { 0 } else { last_line_width },
            last_line_width,
            has_line_feed,
        }
    }
}

/// Offset index over the leaves in document order.
#[derive(Clone, Debug)]
pub(crate) struct BlockIndex {
    starts: Vec<u32>,
    leaves: Vec<LeafText>,
    /// Column at which the first leaf's gap begins.
    leading_column: u32,
}

impl BlockIndex {
    pub(crate) fn new(leaves: Vec<LeafText>, leading_column: u32) -> Self {
        BlockIndex {
            starts: leaves.iter().map(|l| l.range.start).collect(),
            leaves,
            leading_column,
        }
    }

    #[inline]
    pub(crate) fn text(&self, leaf: LeafId) -> &LeafText {
        &self.leaves[leaf.index()]
    }

    /// Leaf starting at `offset`, the leaf whose text contains it, or the
    /// first leaf after it.
    pub(crate) fn leaf_at_or_after(&self, offset: u32) -> Option<LeafId> {
        let after = self.starts.partition_point(|&start| start < offset);
        if after > 0 && self.leaves[after - 1].range.contains(offset) {
            return Some(LeafId::from_index(after - 1));
        }
        (after < self.leaves.len()).then(|| LeafId::from_index(after))
    }

    /// Whether `range` already spans more than one line, or is too long to
    /// ever fit on one.
    ///
    /// Only gaps strictly inside the range count; the gap before its first
    /// leaf belongs to whatever precedes the range.
    pub(crate) fn contains_line_feeds_or_too_long(
        &self,
        range: TextRange,
        whitespaces: &[WhiteSpace],
    ) -> bool {
        let Some(first) = self.leaf_at_or_after(range.start) else {
            return false;
        };
        let mut width: u32 = 0;
        for index in first.index()..self.leaves.len() {
            let text = &self.leaves[index];
            if text.range.start >= range.end {
                break;
            }
            if index != first.index() {
                let ws = &whitespaces[index];
                if ws.contains_line_feeds() {
                    return true;
                }
                width = width.saturating_add(ws.total_spaces());
            }
            if text.has_line_feed {
                return true;
            }
            width = width.saturating_add(text.width);
            if width > MAX_RIGHT_MARGIN {
                return true;
            }
        }
        false
    }

    /// Column at which `leaf` starts under the current whitespace.
    pub(crate) fn start_column(&self, leaf: LeafId, whitespaces: &[WhiteSpace]) -> u32 {
        let mut column: u32 = 0;
        let mut index = leaf.index();
        loop {
            let ws = &whitespaces[index];
            column += ws.total_spaces();
            if ws.is_line_start() {
                return column;
            }
            if index == 0 {
                return column + self.leading_column;
            }
            index -= 1;
            let text = &self.leaves[index];
            if text.has_line_feed {
                return column + text.last_line_width;
            }
            column += text.width;
        }
    }

    /// Column just past the end of `leaf`.
    pub(crate) fn end_column(&self, leaf: LeafId, whitespaces: &[WhiteSpace]) -> u32 {
        let text = self.text(leaf);
        if text.has_line_feed {
            text.last_line_width
        } else {
            self.start_column(leaf, whitespaces) + text.width
        }
    }

    /// Whether a line break separates the start of `a` from the start of `b`.
    pub(crate) fn on_different_lines(&self, a: LeafId, b: LeafId, whitespaces: &[WhiteSpace]) -> bool {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        (a.index()..b.index()).any(|i| {
            self.leaves[i].has_line_feed || whitespaces[i + 1].is_line_start()
        })
    }

    /// First leaf on the line `leaf` is on.
    pub(crate) fn line_start(&self, leaf: LeafId, whitespaces: &[WhiteSpace]) -> LeafId {
        let mut index = leaf.index();
        while index > 0
            && !whitespaces[index].is_line_start()
            && !self.leaves[index - 1].has_line_feed
        {
            index -= 1;
        }
        LeafId::from_index(index)
    }
}
