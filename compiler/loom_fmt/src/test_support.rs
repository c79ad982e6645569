//! Tree construction helpers shared by unit tests.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use loom_ir::{BlockAttrs, BlockId, BlockTree, BlockTreeBuilder, TextRange};

/// Ranges of the whitespace-separated tokens of `text`.
pub(crate) fn token_ranges(text: &str) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                ranges.push(TextRange::new(s as u32, i as u32));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push(TextRange::new(s as u32, text.len() as u32));
    }
    ranges
}

/// One leaf per token under a single root; `attrs(i)` decorates leaf `i`.
pub(crate) fn flat_tree(text: &str, mut attrs: impl FnMut(usize) -> BlockAttrs) -> BlockTree {
    flat_tree_with(text, |_| (), |(), i| attrs(i))
}

/// Like [`flat_tree`], but `setup` registers groups on the builder first and
/// its result is handed to `attrs`.
pub(crate) fn flat_tree_with<S>(
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
