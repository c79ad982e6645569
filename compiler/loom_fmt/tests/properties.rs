//! Property-based tests for the whitespace resolver.
//!
//! Documents are generated as token sequences with random gaps, decorated
//! with a fixed family of layout rules, and checked for:
//! 1. Idempotence: formatting formatted text produces no edits
//! 2. Right margin: wrappable words never end past the margin
//! 3. Alignment: every member of a live group starts at the same column
//! 4. Dependent spacing: settles within the pass bound, and a rule whose
//!    range ends up holding a line break has a break of its own
//! 5. Alignment with wrapping: formatting formatted text produces no edits,
//!    including when a group had to be given up

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "Generated indices are small"
)]

mod common;

use proptest::prelude::*;

use loom_ir::{Alignment, BlockAttrs, BlockTree, FormatOptions, Spacing, TextRange, Wrap, WrapKind};

use common::{breaks_before, flat_tree, format, token_columns, token_ranges};

// -- Generators --

/// Gap text between two words.
fn gap_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![" ", "  ", "   ", "\n", "\n\n\n", " \n  ", "\n    "])
}

/// Words of 1 to 8 letters separated by random gaps.
fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((1usize..=8, gap_strategy()), 1..25).prop_map(|words| {
        let mut text = String::new();
        for (i, (len, gap)) in words.into_iter().enumerate() {
            if i > 0 {
                text.push_str(gap);
            }
            text.push_str(&"w".repeat(len));
        }
        text
    })
}

/// `key value` lines with random key widths, gaps and indentation.
fn key_value_strategy() -> impl Strategy<Value = (String, Vec<usize>)> {
    prop::collection::vec((1usize..=8, 1usize..=3, 0usize..=3), 1..6).prop_map(|lines| {
        let mut text = String::new();
        let mut keys = Vec::new();
        for (i, (key, gap, indent)) in lines.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
                text.push_str(&" ".repeat(indent));
            }
            text.push_str(&"k".repeat(key));
            text.push_str(&" ".repeat(gap));
            text.push('v');
            keys.push(key);
        }
        (text, keys)
    })
}

/// A dependent rule on the gap before some token: the offset of the first
/// token of its range relative to the rule's token, and the range length.
#[derive(Clone, Debug)]
struct Rule {
    offset: i64,
    len: usize,
}

/// Per token: an optional dependent rule and whether the token always breaks.
fn dependent_strategy() -> impl Strategy<Value = Vec<(Option<Rule>, bool)>> {
    let rule = prop::option::weighted(0.4, (-2i64..=3, 0usize..=3))
        .prop_map(|rule| rule.map(|(offset, len)| Rule { offset, len }));
    prop::collection::vec((rule, prop::bool::weighted(0.15)), 3..14)
}

/// Words of 1 to 6 letters, each flagged as an alignment member and as
/// wrappable. No spacing rules apply.
fn aligned_words_strategy() -> impl Strategy<Value = Vec<(usize, &'static str, bool, bool)>> {
    let gap = prop::sample::select(vec![" ", "  ", "\n", "\n  "]);
    prop::collection::vec((1usize..=6, gap, any::<bool>(), any::<bool>()), 1..=11)
}

// -- Tree construction --

fn wrapped_words_tree(text: &str) -> BlockTree {
    flat_tree(
        text,
        |builder| builder.wrap(Wrap::new(WrapKind::Normal)),
        |&wrap, _| {
            BlockAttrs::new()
                .with_spacing(Spacing::spaces_keeping_breaks(1, 1))
                .with_wrap(wrap)
        },
    )
}

fn key_value_tree(text: &str) -> BlockTree {
    flat_tree(
        text,
        |builder| builder.alignment(Alignment::with_backward_shift()),
        |&group, i| match (i, i % 2) {
            (0, _) => BlockAttrs::new(),
            (_, 0) => BlockAttrs::new().with_spacing(Spacing::line_feeds(1, 0)),
            _ => BlockAttrs::new()
                .with_spacing(Spacing::spaces(1))
                .with_alignment(group),
        },
    )
}

fn aligned_words_text(words: &[(usize, &'static str, bool, bool)]) -> String {
    let mut text = String::new();
    for (i, (len, gap, _, _)) in words.iter().enumerate() {
        if i > 0 {
            text.push_str(gap);
        }
        text.push_str(&"w".repeat(*len));
    }
    text
}

fn aligned_words_tree(text: &str, words: &[(usize, &'static str, bool, bool)]) -> BlockTree {
    flat_tree(
        text,
        |builder| {
            (
                builder.alignment(Alignment::with_backward_shift()),
                builder.wrap(Wrap::new(WrapKind::Normal)),
            )
        },
        |&(group, wrap), i| {
            let (_, _, member, wrappable) = words[i];
            let mut attrs = BlockAttrs::new();
            if member {
                attrs = attrs.with_alignment(group);
            }
            if wrappable {
                attrs = attrs.with_wrap(wrap);
            }
            attrs
        },
    )
}

/// Token index range `[first, last]` a rule on token `index` watches.
fn rule_tokens(rule: &Rule, index: usize, count: usize) -> (usize, usize) {
    let first = (index as i64 + rule.offset).clamp(0, count as i64 - 1) as usize;
    let last = (first + rule.len).min(count - 1);
    (first, last)
}

fn dependent_tree(text: &str, tokens: &[(Option<Rule>, bool)]) -> BlockTree {
    let ranges = token_ranges(text);
    flat_tree(
        text,
        |builder| builder.wrap(Wrap::including_first(WrapKind::Always)),
        |&wrap, i| {
            let (rule, always) = &tokens[i];
            let mut attrs = BlockAttrs::new();
            if let Some(rule) = rule {
                let (first, last) = rule_tokens(rule, i, tokens.len());
                let range = TextRange::new(ranges[first].start, ranges[last].end);
                attrs = attrs.with_spacing(Spacing::dependent(1, 1, [range], false, 0));
            }
            if *always {
                attrs = attrs.with_wrap(wrap);
            }
            attrs
        },
    )
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn wrapped_text_is_idempotent(text in text_strategy(), margin in 10u32..40) {
        let options = FormatOptions::with_right_margin(margin);
        let (first, _) = format(&wrapped_words_tree(&text), &text, &options);
        let (second, outcome) = format(&wrapped_words_tree(&first), &first, &options);

        prop_assert!(outcome.edits.is_empty(), "{first:?} reformatted to {second:?}");
    }

    #[test]
    fn wrapped_text_respects_margin(text in text_strategy(), margin in 10u32..40) {
        let options = FormatOptions::with_right_margin(margin);
        let (formatted, _) = format(&wrapped_words_tree(&text), &text, &options);

        for line in formatted.lines() {
            prop_assert!(line.len() <= margin as usize, "line {line:?} exceeds {margin}");
        }
        prop_assert!(!formatted.contains("\n\n\n"));
    }

    #[test]
    fn aligned_values_share_a_column((text, keys) in key_value_strategy()) {
        let options = FormatOptions::default();
        let (formatted, outcome) = format(&key_value_tree(&text), &text, &options);

        prop_assert!(outcome.diagnostics.is_empty());
        let expected = keys.iter().max().copied().unwrap_or(0) as u32 + 1;
        let columns = token_columns(&formatted);
        for value in columns.iter().skip(1).step_by(2) {
            prop_assert_eq!(*value, expected);
        }

        let (_, again) = format(&key_value_tree(&formatted), &formatted, &options);
        prop_assert!(again.edits.is_empty());
    }

    #[test]
    fn aligned_wrapped_words_are_idempotent(words in aligned_words_strategy(), margin in 8u32..=24) {
        let text = aligned_words_text(&words);
        let options = FormatOptions::with_right_margin(margin);
        let (first, _) = format(&aligned_words_tree(&text, &words), &text, &options);
        let (second, outcome) = format(&aligned_words_tree(&first, &words), &first, &options);

        prop_assert!(outcome.edits.is_empty(), "{text:?} formatted to {first:?}, then to {second:?}");
    }

    #[test]
    fn dependent_spacing_converges(tokens in dependent_strategy()) {
        let text = vec!["t"; tokens.len()].join(" ");
        let tree = dependent_tree(&text, &tokens);
        let (formatted, outcome) = format(&tree, &text, &FormatOptions::default());

        // The first token has nothing before it to break.
        let rules = tokens.iter().skip(1).filter(|(rule, _)| rule.is_some()).count() as u32;
        prop_assert!(outcome.stats.restarts <= rules);
        prop_assert!(outcome.stats.passes <= 2 * rules + 1);

        for (i, (rule, _)) in tokens.iter().enumerate().skip(1) {
            let Some(rule) = rule else { continue };
            let (first, last) = rule_tokens(rule, i, tokens.len());
            let range_breaks = (first + 1..=last).any(|j| breaks_before(&formatted, j));
            if range_breaks {
                prop_assert!(
                    breaks_before(&formatted, i),
                    "token {i} watches {first}..={last} in {formatted:?}"
                );
            }
        }
    }
}
