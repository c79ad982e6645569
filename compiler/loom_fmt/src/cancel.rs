//! Cooperative cancellation.
//!
//! The driver consults the check once at the start of every pass, never in
//! the middle of one, so whitespace state is always fully resolved for the
//! passes that did run.

use std::sync::atomic::{AtomicBool, Ordering};

/// Source of a cancellation request.
pub trait CancellationCheck {
    fn is_cancelled(&self) -> bool;
}

/// A check that never fires.
#[derive(Copy, Clone, Debug, Default)]
pub struct NeverCancel;

impl CancellationCheck for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationCheck for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F: Fn() -> bool> CancellationCheck for F {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}
