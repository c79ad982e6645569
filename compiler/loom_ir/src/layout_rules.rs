//! Alignment and wrap groups.
//!
//! Both are shared between blocks: a block refers to its group by
//! [`AlignmentId`](crate::AlignmentId) / [`WrapId`](crate::WrapId), and the
//! group description lives once in the tree.

/// A set of blocks that must start at the same column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Whether an earlier member may be shifted right to match a later one
    /// whose natural column is further right.
    pub allow_backward_shift: bool,
}

impl Alignment {
    /// Alignment that only moves later members.
    pub const fn new() -> Self {
        Alignment {
            allow_backward_shift: false,
        }
    }

    /// Alignment that may shift earlier members right.
    pub const fn with_backward_shift() -> Self {
        Alignment {
            allow_backward_shift: true,
        }
    }
}

/// When a line break is forced before a block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapKind {
    /// Never forced.
    #[default]
    None,
    /// Break only when the line would exceed the right margin.
    Normal,
    /// Always break.
    Always,
    /// Once any member of the group breaks, every member breaks.
    ChopDownIfLong,
}

/// A wrap policy shared by a group of blocks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wrap {
    pub kind: WrapKind,
    /// Whether the first member of the group is subject to `Always` and
    /// `ChopDownIfLong` breaking.
    pub wrap_first_element: bool,
}

impl Wrap {
    /// Create a wrap that exempts the first member.
    pub const fn new(kind: WrapKind) -> Self {
        Wrap {
            kind,
            wrap_first_element: false,
        }
    }

    /// Create a wrap that applies to every member, including the first.
    pub const fn including_first(kind: WrapKind) -> Self {
        Wrap {
            kind,
            wrap_first_element: true,
        }
    }
}
