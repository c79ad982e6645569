//! Block tree arena.
//!
//! A formatting run consumes one immutable tree of layout blocks. Leaves
//! cover token ranges; composites own an ordered, non-empty list of children.
//! All cross-links (parent, children, alignment and wrap groups, language)
//! are arena indices, so the tree is freely shareable by reference while the
//! engine keeps its mutable state elsewhere.
//!
//! Trees are built bottom-up with [`BlockTreeBuilder`]; [`BlockTreeBuilder::build`]
//! validates every structural invariant once, so the engine can rely on them.

use std::ops::Range;

use crate::{
    Alignment, AlignmentId, BlockId, Indent, LanguageId, Spacing, TextRange, Wrap, WrapId,
};

/// Structural invariant violated while building a block tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A composite block without children.
    #[error("composite block {block:?} has no children")]
    EmptyComposite { block: BlockId },
    /// A leaf block with an empty text range.
    #[error("leaf block {block:?} has an empty range {range}")]
    EmptyLeaf { block: BlockId, range: TextRange },
    /// A block id that does not belong to this builder (or refers forward).
    #[error("block {block:?} is not known to the tree")]
    UnknownBlock { block: BlockId },
    /// The same block appears as a child more than once.
    #[error("block {child:?} is attached to more than one parent")]
    ChildAttachedTwice { child: BlockId },
    /// The root block is also attached as somebody's child.
    #[error("root block {root:?} has a parent")]
    RootHasParent { root: BlockId },
    /// Two consecutive leaves overlap or are out of document order.
    #[error("leaf {next:?} at {next_range} does not follow leaf {prev:?} at {prev_range}")]
    UnorderedLeaves {
        prev: BlockId,
        prev_range: TextRange,
        next: BlockId,
        next_range: TextRange,
    },
    /// An alignment group id not created by this builder.
    #[error("alignment {0:?} is not known to the tree")]
    UnknownAlignment(AlignmentId),
    /// A wrap group id not created by this builder.
    #[error("wrap {0:?} is not known to the tree")]
    UnknownWrap(WrapId),
    /// A language id not created by this builder.
    #[error("language {0:?} is not known to the tree")]
    UnknownLanguage(LanguageId),
}

/// Layout attributes attached to a block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockAttrs {
    pub indent: Indent,
    pub alignment: Option<AlignmentId>,
    pub wrap: Option<WrapId>,
    /// Spacing of the gap before the block.
    pub spacing: Option<Spacing>,
    /// Owning language, inherited by descendants that do not set their own.
    pub language: Option<LanguageId>,
}

impl BlockAttrs {
    pub fn new() -> Self {
        BlockAttrs::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_alignment(mut self, alignment: AlignmentId) -> Self {
        self.alignment = Some(alignment);
        self
    }

    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapId) -> Self {
        self.wrap = Some(wrap);
        self
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: LanguageId) -> Self {
        self.language = Some(language);
        self
    }
}

#[derive(Clone, Debug)]
enum Shape {
    Leaf,
    Composite(Vec<BlockId>),
}

/// A node of the block tree.
#[derive(Clone, Debug)]
pub struct Block {
    range: TextRange,
    shape: Shape,
    parent: Option<BlockId>,
    /// Leaves covered by this block, as indices into [`BlockTree::leaves`].
    leaf_span: Range<u32>,
    attrs: BlockAttrs,
}

impl Block {
    /// Document range covered by the block.
    #[inline]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.shape, Shape::Leaf)
    }

    /// Child blocks in document order; empty for leaves.
    pub fn children(&self) -> &[BlockId] {
        match &self.shape {
            Shape::Leaf => &[],
            Shape::Composite(children) => children,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<BlockId> {
        self.parent
    }

    #[inline]
    pub fn indent(&self) -> Indent {
        self.attrs.indent
    }

    #[inline]
    pub fn alignment(&self) -> Option<AlignmentId> {
        self.attrs.alignment
    }

    #[inline]
    pub fn wrap(&self) -> Option<WrapId> {
        self.attrs.wrap
    }

    #[inline]
    pub fn spacing(&self) -> Option<&Spacing> {
        self.attrs.spacing.as_ref()
    }

    #[inline]
    pub fn language(&self) -> Option<LanguageId> {
        self.attrs.language
    }

    /// Indices into [`BlockTree::leaves`] of the leaves under this block.
    #[inline]
    pub fn leaf_span(&self) -> Range<usize> {
        self.leaf_span.start as usize..self.leaf_span.end as usize
    }
}

/// Validated, immutable block tree.
#[derive(Clone, Debug)]
pub struct BlockTree {
    blocks: Vec<Block>,
    root: BlockId,
    leaves: Vec<BlockId>,
    alignments: Vec<Alignment>,
    wraps: Vec<Wrap>,
    languages: Vec<String>,
}

impl BlockTree {
    #[inline]
    pub fn root(&self) -> BlockId {
        self.root
    }

    /// Look up a block. Ids always come from this tree's builder.
    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Number of blocks in the arena, including unreachable ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Leaves reachable from the root, in document order.
    #[inline]
    pub fn leaves(&self) -> &[BlockId] {
        &self.leaves
    }

    /// First leaf under `id` (the block itself for a leaf).
    #[inline]
    pub fn first_leaf(&self, id: BlockId) -> BlockId {
        self.leaves[self.block(id).leaf_span().start]
    }

    /// Last leaf under `id`.
    #[inline]
    pub fn last_leaf(&self, id: BlockId) -> BlockId {
        self.leaves[self.block(id).leaf_span().end - 1]
    }

    #[inline]
    pub fn parent(&self, id: BlockId) -> Option<BlockId> {
        self.block(id).parent
    }

    /// Strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: BlockId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Owning language of a block: its own, or the nearest ancestor's.
    pub fn language_of(&self, id: BlockId) -> Option<LanguageId> {
        self.block(id)
            .language()
            .or_else(|| self.ancestors(id).find_map(|a| self.block(a).language()))
    }

    #[inline]
    pub fn alignment(&self, id: AlignmentId) -> Alignment {
        self.alignments[id.index()]
    }

    #[inline]
    pub fn alignment_count(&self) -> usize {
        self.alignments.len()
    }

    #[inline]
    pub fn wrap(&self, id: WrapId) -> Wrap {
        self.wraps[id.index()]
    }

    #[inline]
    pub fn wrap_count(&self) -> usize {
        self.wraps.len()
    }

    #[inline]
    pub fn language_name(&self, id: LanguageId) -> &str {
        &self.languages[id.index()]
    }
}

/// Iterator over the strict ancestors of a block.
pub struct Ancestors<'a> {
    tree: &'a BlockTree,
    next: Option<BlockId>,
}

impl Iterator for Ancestors<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Bottom-up builder for [`BlockTree`].
///
/// Children must be created before the composite that owns them.
#[derive(Debug, Default)]
pub struct BlockTreeBuilder {
    blocks: Vec<Block>,
    alignments: Vec<Alignment>,
    wraps: Vec<Wrap>,
    languages: Vec<String>,
}

impl BlockTreeBuilder {
    pub fn new() -> Self {
        BlockTreeBuilder::default()
    }

    /// Register an alignment group.
    pub fn alignment(&mut self, alignment: Alignment) -> AlignmentId {
        let id = AlignmentId::from_len(self.alignments.len());
        self.alignments.push(alignment);
        id
    }

    /// Register a wrap group.
    pub fn wrap(&mut self, wrap: Wrap) -> WrapId {
        let id = WrapId::from_len(self.wraps.len());
        self.wraps.push(wrap);
        id
    }

    /// Register a language name, reusing an existing id for a known name.
    pub fn language(&mut self, name: &str) -> LanguageId {
        if let Some(pos) = self.languages.iter().position(|n| n == name) {
            return LanguageId::from_len(pos);
        }
        let id = LanguageId::from_len(self.languages.len());
        self.languages.push(name.to_owned());
        id
    }

    /// Add a leaf covering `range`.
    pub fn leaf(&mut self, range: TextRange, attrs: BlockAttrs) -> BlockId {
        self.push(range, Shape::Leaf, attrs)
    }

    /// Add a composite owning `children` in document order.
    pub fn composite(
        &mut self,
        children: impl IntoIterator<Item = BlockId>,
        attrs: BlockAttrs,
    ) -> BlockId {
        self.push(
            TextRange::EMPTY,
            Shape::Composite(children.into_iter().collect()),
            attrs,
        )
    }

    fn push(&mut self, range: TextRange, shape: Shape, attrs: BlockAttrs) -> BlockId {
        let id = BlockId::from_len(self.blocks.len());
        self.blocks.push(Block {
            range,
            shape,
            parent: None,
            leaf_span: 0..0,
            attrs,
        });
        id
    }

    /// Validate the tree rooted at `root` and freeze it.
    pub fn build(mut self, root: BlockId) -> Result<BlockTree, TreeError> {
        if root.index() >= self.blocks.len() {
            return Err(TreeError::UnknownBlock { block: root });
        }
        self.check_attrs()?;
        self.link_parents()?;
        if self.blocks[root.index()].parent.is_some() {
            return Err(TreeError::RootHasParent { root });
        }

        let leaves = self.collect_leaves(root)?;
        Ok(BlockTree {
            blocks: self.blocks,
            root,
            leaves,
            alignments: self.alignments,
            wraps: self.wraps,
            languages: self.languages,
        })
    }

    fn check_attrs(&self) -> Result<(), TreeError> {
        for block in &self.blocks {
            if let Some(a) = block.attrs.alignment {
                if a.index() >= self.alignments.len() {
                    return Err(TreeError::UnknownAlignment(a));
                }
            }
            if let Some(w) = block.attrs.wrap {
                if w.index() >= self.wraps.len() {
                    return Err(TreeError::UnknownWrap(w));
                }
            }
            if let Some(l) = block.attrs.language {
                if l.index() >= self.languages.len() {
                    return Err(TreeError::UnknownLanguage(l));
                }
            }
        }
        Ok(())
    }

    fn link_parents(&mut self) -> Result<(), TreeError> {
        for index in 0..self.blocks.len() {
            let parent = BlockId::from_len(index);
            let children = match &self.blocks[index].shape {
                Shape::Leaf => {
                    let range = self.blocks[index].range;
                    if range.is_empty() {
                        return Err(TreeError::EmptyLeaf {
                            block: parent,
                            range,
                        });
                    }
                    continue;
                }
                Shape::Composite(children) if children.is_empty() => {
                    return Err(TreeError::EmptyComposite { block: parent });
                }
                Shape::Composite(children) => children.clone(),
            };
            for child in children {
                // Children are created first, so a valid child id is smaller.
                if child.index() >= index {
                    return Err(TreeError::UnknownBlock { block: child });
                }
                let slot = &mut self.blocks[child.index()].parent;
                if slot.is_some() {
                    return Err(TreeError::ChildAttachedTwice { child });
                }
                *slot = Some(parent);
            }
        }
        Ok(())
    }

    /// Walk the tree in document order, assigning leaf spans and composite
    /// ranges, and check that leaves are ordered and disjoint.
    fn collect_leaves(&mut self, root: BlockId) -> Result<Vec<BlockId>, TreeError> {
        let mut leaves: Vec<BlockId> = Vec::new();
        // (block, children visited)
        let mut stack: Vec<(BlockId, bool)> = vec![(root, false)];

        while let Some((id, visited)) = stack.pop() {
            let index = id.index();
            let start = u32::try_from(leaves.len()).unwrap_or(u32::MAX);
            match &self.blocks[index].shape {
                Shape::Leaf => {
                    let range = self.blocks[index].range;
                    if let Some(&prev) = leaves.last() {
                        let prev_range = self.blocks[prev.index()].range;
                        if range.start < prev_range.end {
                            return Err(TreeError::UnorderedLeaves {
                                prev,
                                prev_range,
                                next: id,
                                next_range: range,
                            });
                        }
                    }
                    leaves.push(id);
                    self.blocks[index].leaf_span = start..start + 1;
                }
                Shape::Composite(children) if !visited => {
                    stack.push((id, true));
                    stack.extend(children.iter().rev().map(|&c| (c, false)));
                    self.blocks[index].leaf_span = start..start;
                }
                Shape::Composite(children) => {
                    let first = self.blocks[children[0].index()].range;
                    let last = self.blocks[children[children.len() - 1].index()].range;
                    let block = &mut self.blocks[index];
                    block.leaf_span.end = start;
                    block.range = first.cover(last);
                }
            }
        }
        Ok(leaves)
    }
}
