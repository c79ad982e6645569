//! Indent specifications attached to blocks.

/// How a block is indented relative to its ancestors when it starts a line.
///
/// The value is only a specification; the resolved column lives in the
/// whitespace preceding the block's first leaf.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Indent {
    /// No indent relative to the parent.
    #[default]
    None,

    /// One `indent_size` step.
    ///
    /// When `relative_to_direct_parent` is set and the parent does not start
    /// its line, the indent is measured from the parent's own column instead
    /// of from the indent of the line the parent starts on.
    Normal { relative_to_direct_parent: bool },

    /// `label_indent_size` spaces.
    Label,

    /// Column zero, regardless of any ancestor.
    Absolute,

    /// One `continuation_indent_size` step.
    Continuation { relative_to_direct_parent: bool },

    /// A fixed number of alignment spaces.
    Spaces(u32),

    /// Normal indent that, once enforced, also applies to children of the
    /// block that start a line even if the block itself does not.
    ///
    /// All `Expandable` children of one parent form a single group: once any
    /// leaf under any of them starts a line, the whole group is enforced.
    Expandable,
}

impl Indent {
    /// Normal indent measured from the parent's line.
    pub const NORMAL: Indent = Indent::Normal {
        relative_to_direct_parent: false,
    };

    /// Continuation indent measured from the parent's line.
    pub const CONTINUATION: Indent = Indent::Continuation {
        relative_to_direct_parent: false,
    };

    /// Check if this indent ignores every ancestor.
    #[inline]
    pub fn is_absolute(self) -> bool {
        matches!(self, Indent::Absolute)
    }

    /// Check if this indent is measured from the parent's own column.
    #[inline]
    pub fn is_relative_to_direct_parent(self) -> bool {
        matches!(
            self,
            Indent::Normal {
                relative_to_direct_parent: true
            } | Indent::Continuation {
                relative_to_direct_parent: true
            }
        )
    }

    /// Check if this indent participates in expandable-group enforcement.
    #[inline]
    pub fn is_expandable(self) -> bool {
        matches!(self, Indent::Expandable)
    }
}
