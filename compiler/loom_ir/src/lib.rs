//! Loom IR - Layout Model for the Whitespace Resolver
//!
//! This crate contains the data consumed by the formatting engine:
//! - Text ranges and arena ids
//! - The block tree (leaves, composites, parent links) and its builder
//! - Layout rules: indent, alignment groups, wrap groups, spacing
//! - The document abstraction and text edits
//! - Formatter options
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: blocks and groups live in arenas addressed by
//!   `u32` ids; parents and anchors are ids, never owning references.
//! - **Validate Once**: [`BlockTreeBuilder::build`] checks every structural
//!   invariant, so the engine treats a broken tree as impossible.
//! - **Immutable Input**: nothing here changes during a formatting run; the
//!   engine keeps all mutable state on its side.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod block;
mod document;
mod ids;
mod indent;
mod layout_rules;
mod options;
mod range;
mod spacing;

pub use block::{Ancestors, Block, BlockAttrs, BlockTree, BlockTreeBuilder, TreeError};
pub use document::{apply_edits, Document, EditError, TextDocument, TextEdit};
pub use ids::{AlignmentId, BlockId, LanguageId, WrapId};
pub use indent::Indent;
pub use layout_rules::{Alignment, Wrap, WrapKind};
pub use options::{FormatOptions, IndentOptions, DEFAULT_RIGHT_MARGIN, MAX_RIGHT_MARGIN};
pub use range::{RangeError, TextRange};
pub use spacing::{Spacing, SpacingDependency};
