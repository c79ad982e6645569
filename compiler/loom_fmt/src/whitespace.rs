//! Resolved whitespace between two leaves.
//!
//! Each leaf owns the gap that precedes it. A gap on one line is `spaces`
//! wide; a gap with line feeds ends in `indent_spaces + spaces` columns on the
//! leaf's line, where `indent_spaces` is the structural indent and `spaces`
//! the alignment remainder.

use loom_ir::{IndentOptions, Spacing, TextRange};

/// Whitespace preceding one leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhiteSpace {
    range: TextRange,
    line_feeds: u32,
    spaces: u32,
    indent_spaces: u32,
    read_only: bool,
    line_feeds_read_only: bool,
    /// The gap begins at a line start even though it holds no line feed
    /// (leading whitespace of the first leaf).
    at_line_start: bool,
    /// The original gap put the leaf at column zero of a new line.
    originally_first_column: bool,
    keep_first_column: bool,
}

impl WhiteSpace {
    /// Parse the original gap text. The caller has checked that `text`
    /// contains only whitespace.
    pub(crate) fn from_text(range: TextRange, text: &str, tab_size: u32) -> Self {
        let line_feeds = u32::try_from(text.matches('\n').count()).unwrap_or(u32::MAX);
        let tail = text.rsplit('\n').next().unwrap_or("");
        let width = column_width(tail, 0, tab_size);
        let (indent_spaces, spaces) = if line_feeds > 0 {
            (width, 0)
        } else {
            (0, width)
        };
        WhiteSpace {
            range,
            line_feeds,
            spaces,
            indent_spaces,
            read_only: false,
            line_feeds_read_only: false,
            at_line_start: false,
            originally_first_column: line_feeds > 0 && width == 0,
            keep_first_column: false,
        }
    }

    /// Leading whitespace of the first leaf; its line feeds are never touched.
    pub(crate) fn leading(range: TextRange, text: &str, at_line_start: bool, tab_size: u32) -> Self {
        let width = column_width(text, 0, tab_size);
        WhiteSpace {
            range,
            line_feeds: 0,
            spaces: if at_line_start { 0 } else { width },
            indent_spaces: if at_line_start { width } else { 0 },
            read_only: false,
            line_feeds_read_only: true,
            at_line_start,
            originally_first_column: at_line_start && width == 0,
            keep_first_column: false,
        }
    }

    /// Original range of the gap.
    #[inline]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[inline]
    pub fn line_feeds(&self) -> u32 {
        self.line_feeds
    }

    #[inline]
    pub fn spaces(&self) -> u32 {
        self.spaces
    }

    #[inline]
    pub fn indent_spaces(&self) -> u32 {
        self.indent_spaces
    }

    /// Columns contributed on the leaf's own line.
    #[inline]
    pub fn total_spaces(&self) -> u32 {
        self.spaces + self.indent_spaces
    }

    #[inline]
    pub fn contains_line_feeds(&self) -> bool {
        self.line_feeds > 0
    }

    /// Whether the following leaf is the first thing on its line.
    #[inline]
    pub fn is_line_start(&self) -> bool {
        self.line_feeds > 0 || self.at_line_start
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[inline]
    pub fn is_line_feeds_read_only(&self) -> bool {
        self.line_feeds_read_only
    }

    /// Whether a wrap may turn this gap into a line break.
    #[inline]
    pub fn can_take_line_feed(&self) -> bool {
        !self.read_only && !self.line_feeds_read_only
    }

    #[inline]
    pub fn keep_first_column(&self) -> bool {
        self.keep_first_column
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Set line feeds; dropping to zero also drops the indent.
    pub(crate) fn set_line_feeds(&mut self, line_feeds: u32) {
        if self.read_only || self.line_feeds_read_only {
            return;
        }
        self.line_feeds = line_feeds;
        if line_feeds == 0 {
            self.indent_spaces = 0;
        }
    }

    pub(crate) fn set_spaces(&mut self, spaces: u32, indent_spaces: u32) {
        if self.read_only {
            return;
        }
        self.spaces = spaces;
        self.indent_spaces = indent_spaces;
    }

    /// Put the leaf at `column`, splitting it into indent and alignment parts.
    ///
    /// The indent part never grows, so a tab-indented line keeps its tabs.
    pub(crate) fn set_column(&mut self, column: u32) {
        let indent = self.indent_spaces.min(column);
        self.set_spaces(column - indent, indent);
    }

    /// Resolve the line feed count against `spacing`.
    ///
    /// `triggered` is the current state of a dependent rule's target ranges;
    /// `keep_blank_lines_max` caps blank lines on top of the rule's own cap.
    pub(crate) fn arrange_line_feeds(
        &mut self,
        spacing: Option<&Spacing>,
        triggered: bool,
        keep_blank_lines_max: u32,
    ) {
        if self.read_only || self.line_feeds_read_only {
            return;
        }
        let Some(spacing) = spacing else {
            return;
        };

        let min = spacing.effective_min_line_feeds(triggered);
        let mut line_feeds = self.line_feeds.max(min);

        if line_feeds > 0 {
            let keep_blank_lines = spacing.keep_blank_lines().min(keep_blank_lines_max);
            if keep_blank_lines > 0 {
                if line_feeds > keep_blank_lines + 1 {
                    line_feeds = (keep_blank_lines + 1).max(min);
                }
            } else if line_feeds > min {
                line_feeds = if spacing.keep_line_feeds() {
                    min.max(1)
                } else {
                    min
                };
            }
            if line_feeds == 1 && !spacing.keep_line_feeds() && min == 0 {
                line_feeds = 0;
            }
            if line_feeds > 0 && line_feeds < spacing.pref_line_feeds() {
                line_feeds = spacing.pref_line_feeds();
            }
        }

        self.set_line_feeds(line_feeds);
        self.keep_first_column =
            spacing.keep_first_column() && line_feeds > 0 && self.originally_first_column;
    }

    /// Clamp the spaces of a single-line gap into the rule's bounds.
    pub(crate) fn arrange_spaces(&mut self, spacing: Option<&Spacing>) {
        if self.read_only || self.line_feeds > 0 {
            return;
        }
        let Some(spacing) = spacing else {
            return;
        };
        let spaces = self
            .total_spaces()
            .clamp(spacing.min_spaces(), spacing.max_spaces());
        if self.at_line_start {
            self.set_spaces(0, spaces);
        } else {
            self.set_spaces(spaces, 0);
        }
    }

    /// Render the resolved gap.
    pub fn render(&self, options: &IndentOptions) -> String {
        let mut out = "\n".repeat(self.line_feeds as usize);
        if self.is_line_start() && options.use_tab_character && options.tab_size > 0 {
            let tabs = self.indent_spaces / options.tab_size;
            let rest = self.indent_spaces % options.tab_size;
            out.push_str(&"\t".repeat(tabs as usize));
            out.push_str(&" ".repeat((rest + self.spaces) as usize));
        } else {
            out.push_str(&" ".repeat(self.total_spaces() as usize));
        }
        out
    }
}

/// Display width of `text` starting at `column`, with tab stops every
/// `tab_size` columns. Characters other than tabs count as one column.
pub(crate) fn column_width(text: &str, column: u32, tab_size: u32) -> u32 {
    let mut col = column;
    for c in text.chars() {
        if c == '\t' && tab_size > 0 {
            col += tab_size - col % tab_size;
        } else if c != '\r' {
            col += 1;
        }
    }
    col - column
}
