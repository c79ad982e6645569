//! Shared helpers for the integration tests.

#![allow(dead_code, reason = "Each test binary uses a different subset")]

use loom_fmt::{format_document, FormatOutcome};
use loom_ir::{
    apply_edits, BlockAttrs, BlockId, BlockTree, BlockTreeBuilder, FormatOptions, TextDocument,
    TextRange,
};

/// Ranges of the whitespace-separated tokens of `text`.
pub fn token_ranges(text: &str) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                ranges.push(TextRange::new(s, i as u32));
                start = None;
            }
            (false, None) => start = Some(i as u32),
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push(TextRange::new(s, text.len() as u32));
    }
    ranges
}

/// One leaf per token under a single root. `setup` registers groups on the
/// builder; `attrs` decorates leaf `i` given its result.
pub fn flat_tree<S>(
    text: &str,
    setup: impl FnOnce(&mut BlockTreeBuilder) -> S,
    mut attrs: impl FnMut(&S, usize) -> BlockAttrs,
) -> BlockTree {
    let mut builder = BlockTreeBuilder::new();
    let groups = setup(&mut builder);
    let leaves: Vec<BlockId> = token_ranges(text)
        .into_iter()
        .enumerate()
        .map(|(i, range)| builder.leaf(range, attrs(&groups, i)))
        .collect();
    let root = builder.composite(leaves, BlockAttrs::new());
    builder.build(root).unwrap()
}

/// Format `text` and apply the edits.
pub fn format(tree: &BlockTree, text: &str, options: &FormatOptions) -> (String, FormatOutcome) {
    let document = TextDocument::new(text);
    let outcome = format_document(tree, &document, options).unwrap();
    let formatted = apply_edits(text, &outcome.edits).unwrap();
    (formatted, outcome)
}

/// Column of byte `offset` within its line. Only spaces are expected before it.
pub fn column_of(text: &str, offset: u32) -> u32 {
    let before = &text[..offset as usize];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (before.len() - line_start) as u32
}

/// Start columns of every token of `text`.
pub fn token_columns(text: &str) -> Vec<u32> {
    token_ranges(text)
        .into_iter()
        .map(|range| column_of(text, range.start))
        .collect()
}

/// Whether the gap before token `index` of `text` holds a line break.
pub fn breaks_before(text: &str, index: usize) -> bool {
    let ranges = token_ranges(text);
    index > 0 && text[ranges[index - 1].end as usize..ranges[index].start as usize].contains('\n')
}
