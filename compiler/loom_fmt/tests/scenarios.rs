//! End-to-end formatting scenarios.
//!
//! Each test builds a small block tree over a document, runs the whole
//! engine and checks the resulting text.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use pretty_assertions::assert_eq;

use loom_diagnostic::ErrorCode;
use loom_fmt::{format_range, FormatError, FormatProcessor};
use loom_ir::{
    apply_edits, Alignment, BlockAttrs, BlockTreeBuilder, FormatOptions, Indent, IndentOptions,
    Spacing, TextDocument, TextRange, Wrap, WrapKind,
};

use common::{column_of, flat_tree, format, token_columns};

/// `key value` lines whose values share one alignment group; keys after the
/// first start a new line.
fn key_value_tree(text: &str, alignment: Alignment) -> loom_ir::BlockTree {
    flat_tree(
        text,
        |builder| builder.alignment(alignment),
        |&group, i| match (i, i % 2) {
            (0, _) => BlockAttrs::new(),
            (_, 0) => BlockAttrs::new().with_spacing(Spacing::line_feeds(1, 0)),
            _ => BlockAttrs::new()
                .with_spacing(Spacing::spaces(1))
                .with_alignment(group),
        },
    )
}

// -- Alignment --

#[test]
fn earlier_member_shifted_right_to_later_member() {
    let text = "abc x\nlongname1 y";
    let tree = key_value_tree(text, Alignment::with_backward_shift());
    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());

    assert_eq!(formatted, "abc       x\nlongname1 y");
    assert_eq!(token_columns(&formatted)[1], 10);
    assert_eq!(token_columns(&formatted)[3], 10);
    assert_eq!(outcome.stats.rollbacks, 1);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn later_member_moves_to_earlier_anchor() {
    let text = "longname1 x\nabc y";
    let tree = key_value_tree(text, Alignment::with_backward_shift());
    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());

    assert_eq!(formatted, "longname1 x\nabc       y");
    assert_eq!(outcome.stats.rollbacks, 0);
}

#[test]
fn forward_only_group_leaves_short_anchor_alone() {
    let text = "abc x\nlongname1 y";
    let tree = key_value_tree(text, Alignment::new());
    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());

    assert_eq!(formatted, text);
    assert!(outcome.edits.is_empty());
}

#[test]
fn mutually_shifting_groups_terminate_with_diagnostic() {
    // `b` leads two groups: it aligns `c` forward and is shifted right by
    // `d`, which in turn sits behind `c`.
    let text = "a b\nc d";
    let mut builder = BlockTreeBuilder::new();
    let forward = builder.alignment(Alignment::new());
    let backward = builder.alignment(Alignment::with_backward_shift());
    let a = builder.leaf(TextRange::new(0, 1), BlockAttrs::new());
    let b = builder.leaf(TextRange::new(2, 3), BlockAttrs::new().with_alignment(forward));
    let b_outer = builder.composite([b], BlockAttrs::new().with_alignment(backward));
    let c = builder.leaf(TextRange::new(4, 5), BlockAttrs::new().with_alignment(forward));
    let d = builder.leaf(TextRange::new(6, 7), BlockAttrs::new().with_alignment(backward));
    let root = builder.composite([a, b_outer, c, d], BlockAttrs::new());
    let tree = builder.build(root).unwrap();

    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());

    // The abandoned group's shift of `b` is undone.
    assert_eq!(formatted, "a b\n  c d");
    let codes: Vec<ErrorCode> = outcome.diagnostics.iter().map(|d| d.code).collect();
    assert!(
        codes
            .iter()
            .all(|&code| code == ErrorCode::F0001 || code == ErrorCode::F0002),
        "unexpected diagnostics: {codes:?}"
    );
    assert_eq!(codes.len(), 1);
    assert_eq!(outcome.diagnostics[0].attachments[0].content, text);

    // The surviving group still holds.
    let columns = token_columns(&formatted);
    assert_eq!(columns[1], columns[2]);
}

/// Leaves in `members` share one alignment group that may shift earlier
/// members; leaves in `wrapped` may wrap.
fn backward_group_tree(
    text: &str,
    members: &'static [usize],
    wrapped: &'static [usize],
) -> loom_ir::BlockTree {
    flat_tree(
        text,
        |builder| {
            (
                builder.alignment(Alignment::with_backward_shift()),
                builder.wrap(Wrap::new(WrapKind::Normal)),
            )
        },
        |&(group, wrap), i| {
            let mut attrs = BlockAttrs::new();
            if members.contains(&i) {
                attrs = attrs.with_alignment(group);
            }
            if wrapped.contains(&i) {
                attrs = attrs.with_wrap(wrap);
            }
            attrs
        },
    )
}

#[test]
fn abandoned_shift_is_undone_and_output_is_stable() {
    // Once the third word wraps, two members share a line and the group
    // cannot hold; nothing it moved may stay moved.
    let text = "wwwww  wwww wwwww wwwwww";
    let tree = backward_group_tree(text, &[1, 2, 3], &[2]);
    let options = FormatOptions::with_right_margin(8);

    let (formatted, outcome) = format(&tree, text, &options);
    assert_eq!(formatted, "wwwww  wwww\nwwwww wwwwww");
    let codes: Vec<ErrorCode> = outcome.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::F0002]);

    let retree = backward_group_tree(&formatted, &[1, 2, 3], &[2]);
    let (again, second) = format(&retree, &formatted, &options);
    assert!(second.edits.is_empty(), "{formatted:?} reformatted to {again:?}");
}

#[test]
fn first_leaf_is_never_an_anchor_to_shift() {
    let text = "ww  ww wwww";
    let tree = backward_group_tree(text, &[0, 2], &[1]);
    let options = FormatOptions::with_right_margin(8);

    let (formatted, outcome) = format(&tree, text, &options);
    assert_eq!(formatted, "ww\nww wwww");
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.stats.cycles, 0);

    let retree = backward_group_tree(&formatted, &[0, 2], &[1]);
    let (_, second) = format(&retree, &formatted, &options);
    assert!(second.edits.is_empty());
}

#[test]
fn crossing_groups_stop_at_proven_cycle() {
    // `x` and `y` swap order on the last two lines, so each group keeps
    // shifting the other's anchors right.
    let text = "p x\nq y\nr x y\ns y x";
    let tree = |text: &str| {
        flat_tree(
            text,
            |builder| {
                (
                    builder.alignment(Alignment::with_backward_shift()),
                    builder.alignment(Alignment::with_backward_shift()),
                )
            },
            |&(xs, ys), i| match i {
                1 | 5 | 9 => BlockAttrs::new().with_alignment(xs),
                3 | 6 | 8 => BlockAttrs::new().with_alignment(ys),
                _ => BlockAttrs::new(),
            },
        )
    };
    let options = FormatOptions::default();

    let (formatted, outcome) = format(&tree(text), text, &options);
    assert_eq!(formatted, "p   x\nq y\nr   x y\ns y x");
    assert_eq!(outcome.stats.cycles, 1);
    assert_eq!(outcome.diagnostics.len(), 1);
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.code, ErrorCode::F0001);
    assert_eq!(
        diagnostic.attachment("document.txt").map(|a| a.content.as_str()),
        Some(text)
    );

    let (_, second) = format(&tree(&formatted), &formatted, &options);
    assert!(second.edits.is_empty());
}

// -- Dependent spacing --

#[test]
fn dependent_spacing_follows_wrapped_range() {
    // `d` breaks iff `eee fff` does; `fff` only breaks because the line is
    // too long, which happens after `d` was already placed.
    let text = "f d eee fff";
    let mut builder = BlockTreeBuilder::new();
    let wrap = builder.wrap(Wrap::new(WrapKind::Normal));
    let f = builder.leaf(TextRange::new(0, 1), BlockAttrs::new());
    let d = builder.leaf(
        TextRange::new(2, 3),
        BlockAttrs::new().with_spacing(Spacing::dependent(1, 1, [TextRange::new(4, 11)], false, 0)),
    );
    let eee = builder.leaf(TextRange::new(4, 7), BlockAttrs::new());
    let fff = builder.leaf(TextRange::new(8, 11), BlockAttrs::new().with_wrap(wrap));
    let e = builder.composite([eee, fff], BlockAttrs::new());
    let root = builder.composite([f, d, e], BlockAttrs::new());
    let tree = builder.build(root).unwrap();

    let (formatted, outcome) = format(&tree, text, &FormatOptions::with_right_margin(9));

    assert_eq!(formatted, "f\nd eee\nfff");
    assert_eq!(outcome.stats.restarts, 1);
    assert_eq!(outcome.stats.passes, 2);
}

#[test]
fn dependent_spacing_stays_inline_when_range_fits() {
    let text = "f d eee fff";
    let tree = flat_tree(
        text,
        |_| (),
        |(), i| {
            if i == 1 {
                BlockAttrs::new().with_spacing(Spacing::dependent(
                    1,
                    1,
                    [TextRange::new(4, 11)],
                    false,
                    0,
                ))
            } else {
                BlockAttrs::new()
            }
        },
    );
    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());
    assert_eq!(formatted, text);
    assert_eq!(outcome.stats.passes, 1);
}

#[test]
fn chained_dependent_rules_settle_within_one_pass_each() {
    // Each rule watches the rest of the line; the final leaf always breaks.
    let text = "a b c d e";
    let tree = flat_tree(
        text,
        |builder| builder.wrap(Wrap::including_first(WrapKind::Always)),
        |&wrap, i| match i {
            1..=3 => BlockAttrs::new().with_spacing(Spacing::dependent(
                1,
                1,
                [TextRange::new(2 * i as u32, 9)],
                false,
                0,
            )),
            4 => BlockAttrs::new().with_wrap(wrap),
            _ => BlockAttrs::new(),
        },
    );
    let (formatted, outcome) = format(&tree, text, &FormatOptions::default());

    assert_eq!(formatted, "a\nb\nc\nd\ne");
    assert!(outcome.stats.passes <= 3 + 1);
}

// -- Wrapping --

#[test]
fn words_wrap_at_right_margin() {
    let text = "one two three four five six seven";
    let tree = flat_tree(
        text,
        |builder| builder.wrap(Wrap::new(WrapKind::Normal)),
        |&wrap, _| BlockAttrs::new().with_wrap(wrap),
    );
    let (formatted, _) = format(&tree, text, &FormatOptions::with_right_margin(12));

    assert_eq!(formatted, "one two\nthree four\nfive six\nseven");
    assert!(formatted.lines().all(|line| line.len() <= 12));
}

#[test]
fn overlong_word_gets_its_own_line() {
    let text = "a abcdefghijklmnop b";
    let tree = flat_tree(
        text,
        |builder| builder.wrap(Wrap::new(WrapKind::Normal)),
        |&wrap, _| BlockAttrs::new().with_wrap(wrap),
    );
    let (formatted, _) = format(&tree, text, &FormatOptions::with_right_margin(10));

    assert_eq!(formatted, "a\nabcdefghijklmnop\nb");
}

#[test]
fn chop_down_breaks_every_member() {
    let text = "call(aaaa, bbbb, cccc)";
    let mut builder = BlockTreeBuilder::new();
    let wrap = builder.wrap(Wrap::new(WrapKind::ChopDownIfLong));
    let call = builder.leaf(TextRange::new(0, 5), BlockAttrs::new());
    let args: Vec<_> = [(5, 10), (11, 16), (17, 21)]
        .into_iter()
        .map(|(start, end)| {
            builder.leaf(
                TextRange::new(start, end),
                BlockAttrs::new()
                    .with_wrap(wrap)
                    .with_indent(Indent::CONTINUATION),
            )
        })
        .collect();
    let close = builder.leaf(TextRange::new(21, 22), BlockAttrs::new());
    let list = builder.composite(args, BlockAttrs::new());
    let root = builder.composite([call, list, close], BlockAttrs::new());
    let tree = builder.build(root).unwrap();

    let (formatted, _) = format(&tree, text, &FormatOptions::with_right_margin(18));

    assert_eq!(formatted, "call(aaaa,\n        bbbb,\n        cccc)");
}

// -- Indentation and rendering --

#[test]
fn language_override_renders_tabs() {
    let text = "if\n  body";
    let mut builder = BlockTreeBuilder::new();
    let language = builder.language("make");
    let head = builder.leaf(TextRange::new(0, 2), BlockAttrs::new());
    let body = builder.leaf(
        TextRange::new(5, 9),
        BlockAttrs::new()
            .with_indent(Indent::NORMAL)
            .with_spacing(Spacing::line_feeds(1, 0)),
    );
    let root = builder.composite([head, body], BlockAttrs::new().with_language(language));
    let tree = builder.build(root).unwrap();
    let options = FormatOptions::default().override_language("make", IndentOptions::with_tabs(4));

    let (formatted, _) = format(&tree, text, &options);
    assert_eq!(formatted, "if\n\tbody");
}

#[test]
fn expandable_group_indents_wrapped_children() {
    // `x` and `y` form an expandable group; `y` ends up on its own line, so
    // the group is enforced and `y` gets the group's indent.
    let text = "f x\ny";
    let mut builder = BlockTreeBuilder::new();
    let f = builder.leaf(TextRange::new(0, 1), BlockAttrs::new());
    let x = builder.leaf(TextRange::new(2, 3), BlockAttrs::new());
    let y = builder.leaf(TextRange::new(4, 5), BlockAttrs::new());
    let group = builder.composite([x, y], BlockAttrs::new().with_indent(Indent::Expandable));
    let root = builder.composite([f, group], BlockAttrs::new());
    let tree = builder.build(root).unwrap();

    let (formatted, _) = format(&tree, text, &FormatOptions::default());
    assert_eq!(formatted, "f x\n    y");
    assert_eq!(column_of(&formatted, 8), 4);
}

// -- Range formatting and errors --

#[test]
fn range_formatting_only_touches_range() {
    let text = "a   b   c   d";
    let tree = flat_tree(
        text,
        |_| (),
        |(), _| BlockAttrs::new().with_spacing(Spacing::spaces(1)),
    );
    let document = TextDocument::new(text);
    let outcome = format_range(
        &tree,
        &document,
        &FormatOptions::default(),
        TextRange::new(4, 9),
    )
    .unwrap();

    assert_eq!(apply_edits(text, &outcome.edits).unwrap(), "a   b c   d");
}

#[test]
fn non_whitespace_gap_is_rejected() {
    let text = "a x b";
    let mut builder = BlockTreeBuilder::new();
    let a = builder.leaf(TextRange::new(0, 1), BlockAttrs::new());
    let b = builder.leaf(TextRange::new(4, 5), BlockAttrs::new());
    let root = builder.composite([a, b], BlockAttrs::new());
    let tree = builder.build(root).unwrap();
    let document = TextDocument::new(text);
    let options = FormatOptions::default();

    let result = FormatProcessor::new(&tree, &document, &options);
    assert!(matches!(
        result.err(),
        Some(FormatError::NonWhitespaceGap { range }) if range == TextRange::new(1, 4)
    ));
}
