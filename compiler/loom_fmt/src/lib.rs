//! Loom Formatter
//!
//! Incremental whitespace resolver for layout block trees.
//!
//! # Architecture
//!
//! A language plugin describes a document as a tree of blocks carrying
//! spacing, indent, alignment and wrap rules. The formatter only ever
//! changes the whitespace between consecutive leaves:
//!
//! 1. **Resolve**: walk the leaves in document order, settling each gap
//!    against its rules. Wrapping and alignment may move the walk back to an
//!    earlier leaf; dependent spacing may restart it. The walk repeats until
//!    no rule changes its mind.
//! 2. **Expand**: enforce expandable indents whose groups ended up holding a
//!    line break, then restore alignment for the leaves that moved.
//! 3. **Emit**: diff every gap against the original text and produce edits.
//!
//! Rules that cannot all be satisfied are never an error. The formatter
//! gives up on the offending alignment and reports a [`Diagnostic`].
//!
//! # Modules
//!
//! - [`whitespace`]: the mutable gap before each leaf
//! - [`layout`]: leaves, their gaps and the rules that govern them
//! - [`processor`]: the driver state machine
//! - [`indent`]: indent computation

mod alignment;
mod block_index;
mod cancel;
mod dependent;
mod emit;
mod error;
mod expand;
pub mod indent;
pub mod layout;
pub mod processor;
mod wrap;
pub mod whitespace;

#[cfg(test)]
mod test_support;

use std::sync::Once;

pub use loom_diagnostic::Diagnostic;
use loom_ir::{BlockTree, Document, FormatOptions, TextRange};

pub use cancel::{CancellationCheck, NeverCancel};
pub use error::FormatError;
pub use indent::IndentData;
pub use layout::LeafId;
pub use processor::{FormatOutcome, FormatProcessor, FormatStats, Phase};
pub use whitespace::WhiteSpace;

/// Format the whole document.
///
/// # Example
///
/// ```
/// use loom_fmt::format_document;
/// use loom_ir::{apply_edits, BlockAttrs, BlockTreeBuilder, FormatOptions, Spacing, TextDocument, TextRange};
///
/// let text = "a    b";
/// let mut builder = BlockTreeBuilder::new();
/// let a = builder.leaf(TextRange::new(0, 1), BlockAttrs::new());
/// let b = builder.leaf(TextRange::new(5, 6), BlockAttrs::new().with_spacing(Spacing::spaces(1)));
/// let root = builder.composite([a, b], BlockAttrs::new());
/// let tree = builder.build(root).unwrap();
///
/// let outcome = format_document(&tree, &TextDocument::new(text), &FormatOptions::default()).unwrap();
/// assert_eq!(apply_edits(text, &outcome.edits).unwrap(), "a b");
/// ```
pub fn format_document(
    tree: &BlockTree,
    document: &dyn Document,
    options: &FormatOptions,
) -> Result<FormatOutcome, FormatError> {
    FormatProcessor::new(tree, document, options)?.run()
}

/// Format only the whitespace lying fully inside `range`.
///
/// The whole tree still takes part in layout, so columns and wrapping
/// decisions outside the range are honored; they are just never edited.
pub fn format_range(
    tree: &BlockTree,
    document: &dyn Document,
    options: &FormatOptions,
    range: TextRange,
) -> Result<FormatOutcome, FormatError> {
    FormatProcessor::new(tree, document, options)?
        .with_range(range)?
        .run()
}

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber for formatter diagnostics.
///
/// Call once at startup. Controlled by `RUST_LOG`:
/// - `RUST_LOG=loom_fmt=debug`: pass starts, restarts, edit counts
/// - `RUST_LOG=loom_fmt=trace`: every rollback and alignment decision
///
/// Does nothing if `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
