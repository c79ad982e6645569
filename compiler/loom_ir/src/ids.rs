//! Arena indices for the block tree.
//!
//! Blocks, alignment groups, wrap groups and languages are stored in flat
//! vectors inside [`BlockTree`](crate::BlockTree) and referenced by `u32`
//! indices. Parent links and alignment anchors are indices too, so the tree
//! has no ownership cycles.

use std::fmt;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an index from its raw value.
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the position in the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub(crate) fn from_len(len: usize) -> Self {
                $name(u32::try_from(len).unwrap_or(u32::MAX))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_index!(
    /// Index of a block in the tree arena.
    BlockId
);

define_index!(
    /// Index of an alignment group.
    AlignmentId
);

define_index!(
    /// Index of a wrap group.
    WrapId
);

define_index!(
    /// Index of an owning language name.
    LanguageId
);

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{AlignmentId, BlockId, WrapId};
    crate::static_assert_size!(BlockId, 4);
    crate::static_assert_size!(Option<BlockId>, 8);
    crate::static_assert_size!(AlignmentId, 4);
    crate::static_assert_size!(WrapId, 4);
}
