//! Indent resolution.
//!
//! A leaf that starts a line is indented from its ancestor chain: every
//! block on the way up whose first leaf starts the line contributes its own
//! [`Indent`], and the walk stops at the first ancestor that starts an
//! earlier line, inheriting that line's column. A leaf with an active
//! alignment is positioned by the alignment resolver on top of that.

mod data;

pub use data::IndentData;

use rustc_hash::FxHashSet;

use loom_ir::{BlockId, Indent, IndentOptions};

use crate::alignment::AlignmentResolver;
use crate::layout::{Layout, LeafId};

/// Indent a line-starting `leaf` gets from its ancestors.
///
/// `enforced` holds the parents of expandable groups that were enforced;
/// their expandable children contribute indent even when they do not start
/// the line themselves.
pub(crate) fn compute_indent(
    layout: &Layout<'_>,
    leaf: LeafId,
    enforced: &FxHashSet<BlockId>,
) -> IndentData {
    if layout.ws(leaf).keep_first_column() {
        return IndentData::default();
    }
    let options = layout.indent_options(leaf);
    let tree = layout.tree();
    let mut acc = IndentData::default();
    let mut child = layout.block(leaf);
    loop {
        let block = tree.block(child);
        let indent = block.indent();
        let parent = block.parent();
        let starts_line = layout.ws(layout.first_leaf(child)).is_line_start();
        let enforced_expand =
            indent.is_expandable() && parent.is_some_and(|p| enforced.contains(&p));

        if starts_line || enforced_expand {
            acc = add_indent(acc, indent, options);
        }
        if indent.is_absolute() && starts_line {
            return acc;
        }
        let Some(parent) = parent else {
            return acc;
        };

        let parent_first = layout.first_leaf(parent);
        if parent_first != leaf {
            let ws = layout.ws(parent_first);
            if ws.is_line_start() {
                return acc + IndentData::new(ws.indent_spaces(), ws.spaces());
            }
            if indent.is_relative_to_direct_parent() {
                return acc.align(layout.start_column(parent_first));
            }
        }
        child = parent;
    }
}

fn add_indent(acc: IndentData, indent: Indent, options: &IndentOptions) -> IndentData {
    match indent {
        Indent::None | Indent::Absolute => acc,
        Indent::Normal { .. } | Indent::Expandable => acc.indent(options.indent_size),
        Indent::Continuation { .. } => acc.indent(options.continuation_indent_size),
        Indent::Label => acc.indent(options.label_indent_size),
        Indent::Spaces(n) => acc.align(n),
    }
}

/// Position `leaf` without alignment: ancestor indent on a line start,
/// the spacing rule's bounds otherwise.
///
/// The first leaf keeps its original position; it is the base every other
/// line is measured from.
pub(crate) fn adjust_line_indent(layout: &mut Layout<'_>, leaf: LeafId, enforced: &FxHashSet<BlockId>) {
    if leaf == LeafId::FIRST || layout.ws(leaf).is_read_only() {
        return;
    }
    if layout.ws(leaf).is_line_start() {
        let data = compute_indent(layout, leaf, enforced);
        layout
            .ws_mut(leaf)
            .set_spaces(data.spaces, data.indent_spaces);
    } else {
        let spacing = layout.spacing(leaf);
        layout.ws_mut(leaf).arrange_spaces(spacing);
    }
}

/// Position `leaf`, letting its active alignment override the plain
/// position. Returns the leaf the walk must resume at when alignment
/// shifted an earlier leaf.
pub(crate) fn adjust_indent(
    layout: &mut Layout<'_>,
    alignments: &mut AlignmentResolver,
    leaf: LeafId,
    enforced: &FxHashSet<BlockId>,
) -> Option<LeafId> {
    if layout.ws(leaf).is_read_only() {
        return None;
    }
    adjust_line_indent(layout, leaf, enforced);
    let alignment = alignments.active_alignment(layout, leaf)?;
    let outcome = alignments.apply_alignment(layout, alignment, leaf);
    tracing::trace!(leaf = leaf.raw(), ?outcome, "alignment applied");
    outcome.rollback()
}
