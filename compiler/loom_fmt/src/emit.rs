//! Edit generation.

use loom_ir::TextEdit;

use crate::layout::Layout;

/// Replacement for every gap whose rendering differs from the original
/// text, in ascending offset order.
pub(crate) fn collect_edits(layout: &Layout<'_>) -> Vec<TextEdit> {
    let text = layout.document().text();
    let mut edits = Vec::new();
    for leaf in layout.leaf_ids() {
        let ws = layout.ws(leaf);
        if ws.is_read_only() {
            continue;
        }
        let rendered = ws.render(layout.indent_options(leaf));
        let range = ws.range();
        if text[range.to_range()] != rendered {
            edits.push(TextEdit::new(range, rendered));
        }
    }
    tracing::debug!(edits = edits.len(), "edits collected");
    edits
}
