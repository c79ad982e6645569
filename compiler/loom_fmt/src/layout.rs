//! Shared state of one formatting run.
//!
//! [`Layout`] owns the only mutable data of the run, the whitespace before
//! every leaf, next to static per-leaf facts derived once from the block
//! tree: which spacing rule governs the gap, which alignment and wrap groups
//! start at the leaf, and which indent options apply. Resolvers receive the
//! layout as a parameter; none of them holds a reference to another.

use std::fmt;

use smallvec::SmallVec;

use loom_ir::{
    AlignmentId, BlockId, BlockTree, Document, FormatOptions, IndentOptions, Spacing, TextRange,
    WrapId,
};

use crate::block_index::{BlockIndex, LeafText};
use crate::whitespace::{column_width, WhiteSpace};
use crate::FormatError;

/// Position of a leaf in document order.
///
/// Consecutive leaves have consecutive ids, so stepping forward or back is
/// plain arithmetic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct LeafId(u32);

impl LeafId {
    pub const FIRST: LeafId = LeafId(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        LeafId(raw)
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        LeafId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The following leaf id; may be one past the last leaf.
    #[inline]
    #[must_use]
    pub const fn next(self) -> LeafId {
        LeafId(self.0 + 1)
    }

    #[inline]
    pub fn prev(self) -> Option<LeafId> {
        self.0.checked_sub(1).map(LeafId)
    }
}

impl fmt::Debug for LeafId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafId({})", self.0)
    }
}

/// Static layout facts for one leaf.
#[derive(Clone, Debug)]
struct LeafAttrs {
    block: BlockId,
    /// Outermost block starting at the leaf that carries a spacing rule.
    spacing_block: Option<BlockId>,
    /// Alignment groups starting at the leaf, innermost first.
    alignments: SmallVec<[AlignmentId; 2]>,
    /// Wrap groups starting at the leaf, innermost first.
    wraps: SmallVec<[WrapId; 2]>,
    options: IndentOptions,
}

/// Mutable whitespace state plus static leaf facts.
pub(crate) struct Layout<'a> {
    tree: &'a BlockTree,
    document: &'a dyn Document,
    options: &'a FormatOptions,
    index: BlockIndex,
    whitespaces: Vec<WhiteSpace>,
    attrs: Vec<LeafAttrs>,
}

impl<'a> Layout<'a> {
    /// Read the original whitespace around every leaf.
    pub(crate) fn new(
        tree: &'a BlockTree,
        document: &'a dyn Document,
        options: &'a FormatOptions,
    ) -> Result<Self, FormatError> {
        let text = document.text();
        let len = document.text_len();
        let leaves = tree.leaves();

        let mut texts = Vec::with_capacity(leaves.len());
        let mut whitespaces = Vec::with_capacity(leaves.len());
        let mut attrs = Vec::with_capacity(leaves.len());
        let mut leading_column = 0;
        let mut prev_end: Option<u32> = None;

        for &block in leaves {
            let range = tree.block(block).range();
            if range.end > len
                || !text.is_char_boundary(range.start as usize)
                || !text.is_char_boundary(range.end as usize)
            {
                return Err(FormatError::RangeOutOfDocument { range, len });
            }

            let language = tree.language_of(block).map(|l| tree.language_name(l));
            let leaf_options = *options.indent_for(language);
            let tab_size = leaf_options.tab_size;

            let mut ws = match prev_end {
                None => {
                    let (ws, column) = leading_whitespace(document, range.start, tab_size);
                    leading_column = column;
                    ws
                }
                Some(prev_end) => {
                    let gap_range = TextRange::new(prev_end, range.start);
                    let gap = &text[gap_range.to_range()];
                    if !gap.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
                        return Err(FormatError::NonWhitespaceGap { range: gap_range });
                    }
                    WhiteSpace::from_text(gap_range, gap, tab_size)
                }
            };

            let mut leaf_attrs = LeafAttrs {
                block,
                spacing_block: None,
                alignments: SmallVec::new(),
                wraps: SmallVec::new(),
                options: leaf_options,
            };
            let mut current = Some(block);
            while let Some(id) = current {
                if tree.first_leaf(id) != block {
                    break;
                }
                let node = tree.block(id);
                if node.spacing().is_some() {
                    leaf_attrs.spacing_block = Some(id);
                }
                leaf_attrs.alignments.extend(node.alignment());
                leaf_attrs.wraps.extend(node.wrap());
                current = node.parent();
            }
            // Nothing precedes the first leaf to space it against.
            if prev_end.is_none() {
                leaf_attrs.spacing_block = None;
            }
            if leaf_attrs
                .spacing_block
                .and_then(|id| tree.block(id).spacing())
                .is_some_and(Spacing::is_read_only)
            {
                ws.set_read_only(true);
            }

            texts.push(LeafText::new(range, &text[range.to_range()], tab_size));
            whitespaces.push(ws);
            attrs.push(leaf_attrs);
            prev_end = Some(range.end);
        }

        Ok(Layout {
            tree,
            document,
            options,
            index: BlockIndex::new(texts, leading_column),
            whitespaces,
            attrs,
        })
    }

    /// Freeze every gap not fully inside `range`.
    pub(crate) fn restrict_to(&mut self, range: TextRange) {
        for ws in &mut self.whitespaces {
            if !range.contains_range(ws.range()) {
                ws.set_read_only(true);
            }
        }
    }

    #[inline]
    pub(crate) fn tree(&self) -> &'a BlockTree {
        self.tree
    }

    #[inline]
    pub(crate) fn document(&self) -> &'a dyn Document {
        self.document
    }

    #[inline]
    pub(crate) fn options(&self) -> &'a FormatOptions {
        self.options
    }

    #[inline]
    pub(crate) fn leaf_count(&self) -> usize {
        self.whitespaces.len()
    }

    /// Whether `leaf` is past the last leaf.
    #[inline]
    pub(crate) fn is_end(&self, leaf: LeafId) -> bool {
        leaf.index() >= self.whitespaces.len()
    }

    pub(crate) fn leaf_ids(&self) -> impl Iterator<Item = LeafId> {
        (0..self.whitespaces.len()).map(LeafId::from_index)
    }

    #[inline]
    pub(crate) fn block(&self, leaf: LeafId) -> BlockId {
        self.attrs[leaf.index()].block
    }

    /// First leaf under `block`.
    #[inline]
    pub(crate) fn first_leaf(&self, block: BlockId) -> LeafId {
        LeafId::from_index(self.tree.block(block).leaf_span().start)
    }

    /// Leaves under `block`.
    pub(crate) fn leaves_of(&self, block: BlockId) -> impl Iterator<Item = LeafId> {
        self.tree.block(block).leaf_span().map(LeafId::from_index)
    }

    /// Spacing rule of the gap before `leaf`.
    pub(crate) fn spacing(&self, leaf: LeafId) -> Option<&'a Spacing> {
        let tree: &'a BlockTree = self.tree;
        self.attrs[leaf.index()]
            .spacing_block
            .and_then(|id| tree.block(id).spacing())
    }

    /// Block that carries the spacing rule of `leaf`.
    #[cfg(test)]
    pub(crate) fn spacing_block(&self, leaf: LeafId) -> Option<BlockId> {
        self.attrs[leaf.index()].spacing_block
    }

    /// Alignment groups starting at `leaf`, innermost first.
    #[inline]
    pub(crate) fn alignments(&self, leaf: LeafId) -> &[AlignmentId] {
        &self.attrs[leaf.index()].alignments
    }

    /// Wrap groups starting at `leaf`, innermost first.
    #[inline]
    pub(crate) fn wraps(&self, leaf: LeafId) -> &[WrapId] {
        &self.attrs[leaf.index()].wraps
    }

    #[inline]
    pub(crate) fn indent_options(&self, leaf: LeafId) -> &IndentOptions {
        &self.attrs[leaf.index()].options
    }

    pub(crate) fn language_name(&self, leaf: LeafId) -> Option<&'a str> {
        let tree: &'a BlockTree = self.tree;
        tree.language_of(self.block(leaf))
            .map(|l| tree.language_name(l))
    }

    #[inline]
    pub(crate) fn ws(&self, leaf: LeafId) -> &WhiteSpace {
        &self.whitespaces[leaf.index()]
    }

    #[inline]
    pub(crate) fn ws_mut(&mut self, leaf: LeafId) -> &mut WhiteSpace {
        &mut self.whitespaces[leaf.index()]
    }

    #[inline]
    pub(crate) fn whitespaces(&self) -> &[WhiteSpace] {
        &self.whitespaces
    }

    #[inline]
    pub(crate) fn leaf_range(&self, leaf: LeafId) -> TextRange {
        self.index.text(leaf).range
    }

    #[cfg(test)]
    pub(crate) fn leaf_at_or_after(&self, offset: u32) -> Option<LeafId> {
        self.index.leaf_at_or_after(offset)
    }

    pub(crate) fn start_column(&self, leaf: LeafId) -> u32 {
        self.index.start_column(leaf, &self.whitespaces)
    }

    pub(crate) fn end_column(&self, leaf: LeafId) -> u32 {
        self.index.end_column(leaf, &self.whitespaces)
    }

    pub(crate) fn on_different_lines(&self, a: LeafId, b: LeafId) -> bool {
        self.index.on_different_lines(a, b, &self.whitespaces)
    }

    pub(crate) fn line_start(&self, leaf: LeafId) -> LeafId {
        self.index.line_start(leaf, &self.whitespaces)
    }

    pub(crate) fn contains_line_feeds_or_too_long(&self, range: TextRange) -> bool {
        self.index
            .contains_line_feeds_or_too_long(range, &self.whitespaces)
    }
}

/// Whitespace before the first leaf: the blanks between it and the previous
/// non-blank character on its line. Returns the gap and the column the gap
/// starts at.
fn leading_whitespace(document: &dyn Document, start: u32, tab_size: u32) -> (WhiteSpace, u32) {
    let before = &document.text()[..start as usize];
    let line_start = document.line_start_offset(document.line_number(start)) as usize;
    let line = &before[line_start..];
    let blank = line.len() - line.trim_end_matches([' ', '\t']).len();
    let gap_start = before.len() - blank;
    let column = column_width(&before[line_start..gap_start], 0, tab_size);

    let range = TextRange::new(u32::try_from(gap_start).unwrap_or(u32::MAX), start);
    let ws = WhiteSpace::leading(range, &before[gap_start..], blank == line.len(), tab_size);
    (ws, column)
}
