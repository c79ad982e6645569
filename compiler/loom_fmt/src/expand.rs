//! Expandable-indent reconciliation.
//!
//! `Expandable` children of one parent form a group. While the walk runs,
//! every line start registers the groups it sits in. Once the walk has
//! settled, each registered group that still holds a line start is
//! enforced: its members indent their line-starting leaves as if the member
//! itself started a line. Only leaves under enforced groups are re-indented,
//! followed by a forward-only alignment sweep for leaves the re-indent
//! moved.

use std::iter;

use rustc_hash::FxHashSet;

use loom_ir::BlockId;

use crate::alignment::AlignmentResolver;
use crate::indent::compute_indent;
use crate::layout::{Layout, LeafId};

#[derive(Default)]
pub(crate) struct ExpandableIndents {
    /// Parents of registered groups, in registration order.
    groups: Vec<BlockId>,
    registered: FxHashSet<BlockId>,
    enforced: FxHashSet<BlockId>,
}

impl ExpandableIndents {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Parents of enforced groups.
    #[inline]
    pub(crate) fn enforced(&self) -> &FxHashSet<BlockId> {
        &self.enforced
    }

    /// Register the groups containing the line-starting `leaf`.
    pub(crate) fn register(&mut self, layout: &Layout<'_>, leaf: LeafId) {
        let tree = layout.tree();
        let block = layout.block(leaf);
        for id in iter::once(block).chain(tree.ancestors(block)) {
            let node = tree.block(id);
            if !node.indent().is_expandable() {
                continue;
            }
            if let Some(parent) = node.parent() {
                if self.registered.insert(parent) {
                    self.groups.push(parent);
                }
            }
        }
    }

    /// Expandable children of `parent`.
    fn members<'t>(layout: &Layout<'t>, parent: BlockId) -> impl Iterator<Item = BlockId> + 't {
        let tree = layout.tree();
        tree.block(parent)
            .children()
            .iter()
            .copied()
            .filter(move |&child| tree.block(child).indent().is_expandable())
    }

    /// Enforce the registered groups that still hold a line start and
    /// re-indent the leaves under them. Returns the number of groups
    /// enforced.
    #[tracing::instrument(level = "debug", skip_all, fields(groups = self.groups.len()))]
    pub(crate) fn reconcile(
        &mut self,
        layout: &mut Layout<'_>,
        alignments: &AlignmentResolver,
    ) -> usize {
        let mut affected: Vec<LeafId> = Vec::new();
        let mut count = 0;
        for &parent in &self.groups {
            let leaves: Vec<LeafId> = Self::members(layout, parent)
                .flat_map(|member| layout.leaves_of(member))
                .collect();
            if !leaves.iter().any(|&leaf| layout.ws(leaf).is_line_start()) {
                continue;
            }
            if self.enforced.insert(parent) {
                count += 1;
                tracing::debug!(parent = parent.raw(), "expandable indent enforced");
            }
            affected.extend(leaves);
        }
        if affected.is_empty() {
            return count;
        }
        affected.sort_unstable();
        affected.dedup();

        // Document order: a line's indent may be read from an earlier line.
        for &leaf in &affected {
            let ws = layout.ws(leaf);
            if leaf == LeafId::FIRST || ws.is_read_only() || !ws.is_line_start() {
                continue;
            }
            let data = compute_indent(layout, leaf, &self.enforced);
            layout
                .ws_mut(leaf)
                .set_spaces(data.spaces, data.indent_spaces);
        }

        for leaf in layout.leaf_ids().collect::<Vec<_>>() {
            if let Some(alignment) = alignments.active_alignment(layout, leaf) {
                alignments.align_forward(layout, alignment, leaf);
            }
        }
        count
    }
}
