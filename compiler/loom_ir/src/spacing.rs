//! Spacing rules governing the gap before a block.
//!
//! A rule bounds the number of spaces when the gap stays on one line and the
//! number of line feeds otherwise. A dependent rule computes its minimum line
//! feeds from whether some other text range currently contains a line feed.

use smallvec::SmallVec;

use crate::TextRange;

/// Target ranges of a dependent spacing rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpacingDependency {
    ranges: SmallVec<[TextRange; 2]>,
}

impl SpacingDependency {
    /// Ranges whose line-feed status drives the rule.
    pub fn ranges(&self) -> &[TextRange] {
        &self.ranges
    }
}

/// A spacing rule for the whitespace preceding a block.
///
/// Constructors clamp out-of-range values: `max_spaces >= min_spaces` and
/// `pref_line_feeds >= min_line_feeds` always hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    min_spaces: u32,
    max_spaces: u32,
    min_line_feeds: u32,
    pref_line_feeds: u32,
    keep_line_feeds: bool,
    keep_blank_lines: u32,
    keep_first_column: bool,
    safe: bool,
    read_only: bool,
    dependency: Option<SpacingDependency>,
}

impl Spacing {
    /// Create a rule.
    pub fn new(
        min_spaces: u32,
        max_spaces: u32,
        min_line_feeds: u32,
        keep_line_feeds: bool,
        keep_blank_lines: u32,
    ) -> Self {
        Spacing {
            min_spaces,
            max_spaces: max_spaces.max(min_spaces),
            min_line_feeds,
            pref_line_feeds: min_line_feeds,
            keep_line_feeds,
            keep_blank_lines,
            keep_first_column: false,
            safe: true,
            read_only: false,
            dependency: None,
        }
    }

    /// Exactly `count` spaces on one line; existing line breaks are removed.
    pub fn spaces(count: u32) -> Self {
        Spacing::new(count, count, 0, false, 0)
    }

    /// Exactly `count` spaces; existing line breaks (up to `keep_blank_lines`
    /// blank lines) are kept.
    pub fn spaces_keeping_breaks(count: u32, keep_blank_lines: u32) -> Self {
        Spacing::new(count, count, 0, true, keep_blank_lines)
    }

    /// At least `count` line feeds; extra ones up to `keep_blank_lines` blank
    /// lines are kept.
    pub fn line_feeds(count: u32, keep_blank_lines: u32) -> Self {
        Spacing::new(0, 0, count, true, keep_blank_lines)
    }

    /// A rule whose whitespace is never touched.
    pub fn read_only() -> Self {
        Spacing {
            read_only: true,
            ..Spacing::new(0, 0, 0, true, u32::MAX)
        }
    }

    /// A rule requiring a line break iff any of `ranges` contains a line feed
    /// (or is too long to fit on one line).
    pub fn dependent(
        min_spaces: u32,
        max_spaces: u32,
        ranges: impl IntoIterator<Item = TextRange>,
        keep_line_feeds: bool,
        keep_blank_lines: u32,
    ) -> Self {
        Spacing {
            dependency: Some(SpacingDependency {
                ranges: ranges.into_iter().collect(),
            }),
            ..Spacing::new(min_spaces, max_spaces, 0, keep_line_feeds, keep_blank_lines)
        }
    }

    /// Keep a block that starts at column zero of a new line there.
    #[must_use]
    pub fn with_keep_first_column(mut self, keep: bool) -> Self {
        self.keep_first_column = keep;
        self
    }

    /// Line feeds to use whenever the gap keeps at least one.
    #[must_use]
    pub fn with_pref_line_feeds(mut self, pref: u32) -> Self {
        self.pref_line_feeds = pref.max(self.min_line_feeds);
        self
    }

    /// Whether wrapping may insert a line break into this gap.
    #[must_use]
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn min_spaces(&self) -> u32 {
        self.min_spaces
    }

    pub fn max_spaces(&self) -> u32 {
        self.max_spaces
    }

    /// Configured minimum line feeds; dependent rules report 0 here.
    pub fn min_line_feeds(&self) -> u32 {
        self.min_line_feeds
    }

    pub fn pref_line_feeds(&self) -> u32 {
        self.pref_line_feeds
    }

    pub fn keep_line_feeds(&self) -> bool {
        self.keep_line_feeds
    }

    pub fn keep_blank_lines(&self) -> u32 {
        self.keep_blank_lines
    }

    pub fn keep_first_column(&self) -> bool {
        self.keep_first_column
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn dependency(&self) -> Option<&SpacingDependency> {
        self.dependency.as_ref()
    }

    pub fn is_dependent(&self) -> bool {
        self.dependency.is_some()
    }

    /// Minimum line feeds in effect.
    ///
    /// For a dependent rule, `triggered` tells whether a target range
    /// currently contains a line feed; plain rules ignore it.
    pub fn effective_min_line_feeds(&self, triggered: bool) -> u32 {
        if self.dependency.is_some() {
            u32::from(triggered)
        } else {
            self.min_line_feeds
        }
    }
}
