//! Dependent-spacing tracking.
//!
//! A dependent spacing rule wants a line break iff one of its target ranges
//! contains a line feed. The leaf carrying the rule is usually processed
//! before the leaves inside its targets, so its decision is provisional:
//! the tracker remembers every target range still ahead of the walk and,
//! whenever a later gap is resolved, rechecks the ranges holding that gap,
//! narrowest first, until one of them changes its mind.
//!
//! A rule that changes its mind for the first time is frozen with the new
//! value and the whole walk restarts. A frozen rule only ever moves from "no
//! break" to "break", and does so without a restart: the leaf is queued for
//! another pass after the current one. Each rule therefore causes at most
//! two extra passes.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use loom_ir::{Spacing, TextRange};

use crate::layout::{Layout, LeafId};

/// What the driver must do after a gap was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DependentChange {
    Unchanged,
    /// A rule flipped for the first time; restart the walk now.
    Restart,
    /// A frozen rule now needs a break; run one more pass afterwards.
    Deferred,
}

#[derive(Copy, Clone, Debug, Default)]
struct RuleState {
    /// Whether a target range contains a line feed, as last decided.
    triggered: bool,
    /// The decision flipped once and is no longer recomputed.
    frozen: bool,
    /// Pass in which the rule was last rechecked.
    resolved_in_pass: Option<u32>,
}

/// Key of a pending target range: end ascending, then start descending, then
/// the leaf carrying the rule.
type RangeKey = (u32, Reverse<u32>, LeafId);

#[derive(Default)]
pub(crate) struct DependentTracker {
    pending: BTreeSet<RangeKey>,
    states: FxHashMap<LeafId, RuleState>,
    align_again: FxHashSet<LeafId>,
}

impl DependentTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Forget the pending ranges; they are registered again as the walk
    /// revisits their leaves.
    pub(crate) fn start_pass(&mut self) {
        self.pending.clear();
    }

    /// Current decision for the rule before `leaf`, recomputed unless frozen.
    pub(crate) fn refresh(&mut self, layout: &Layout<'_>, leaf: LeafId) -> bool {
        let Some(dependency) = layout.spacing(leaf).and_then(Spacing::dependency) else {
            return false;
        };
        let state = self.states.entry(leaf).or_default();
        if !state.frozen {
            state.triggered = dependency
                .ranges()
                .iter()
                .any(|&range| layout.contains_line_feeds_or_too_long(range));
        }
        state.triggered
    }

    /// Remember the target ranges of the rule before `leaf` that are not
    /// yet behind the walk.
    pub(crate) fn register(&mut self, layout: &Layout<'_>, leaf: LeafId, pass: u32) {
        let Some(dependency) = layout.spacing(leaf).and_then(Spacing::dependency) else {
            return;
        };
        let ws = layout.ws(leaf);
        if ws.is_read_only() || ws.is_line_feeds_read_only() {
            return;
        }
        if self
            .states
            .get(&leaf)
            .is_some_and(|state| state.resolved_in_pass == Some(pass))
        {
            return;
        }
        let start = ws.range().start;
        for range in dependency.ranges() {
            if range.end > start {
                self.pending.insert((range.end, Reverse(range.start), leaf));
            }
        }
    }

    /// Recheck the pending ranges holding the gap `changed`, narrowest first,
    /// and report the first rule that changed its mind.
    pub(crate) fn should_reformat(
        &mut self,
        layout: &Layout<'_>,
        changed: TextRange,
        pass: u32,
    ) -> DependentChange {
        let from: RangeKey = (changed.end, Reverse(u32::MAX), LeafId::FIRST);
        for &(end, Reverse(start), leaf) in self.pending.range(from..) {
            if !TextRange::new(start, end).contains_range(changed) {
                continue;
            }
            let state = self.states.entry(leaf).or_default();
            if state.resolved_in_pass == Some(pass) || (state.frozen && state.triggered) {
                continue;
            }
            let Some(dependency) = layout.spacing(leaf).and_then(Spacing::dependency) else {
                continue;
            };
            let fresh = dependency
                .ranges()
                .iter()
                .any(|&range| layout.contains_line_feeds_or_too_long(range));
            if fresh == state.triggered {
                continue;
            }

            state.resolved_in_pass = Some(pass);
            state.triggered = fresh;
            if !state.frozen {
                state.frozen = true;
                tracing::debug!(leaf = leaf.raw(), triggered = fresh, "dependent spacing flipped");
                return DependentChange::Restart;
            }
            // Frozen and not triggered, so the rule now wants a break.
            self.align_again.insert(leaf);
            tracing::debug!(leaf = leaf.raw(), "dependent spacing deferred to next pass");
            return DependentChange::Deferred;
        }
        DependentChange::Unchanged
    }

    /// Whether a frozen rule is waiting for another pass.
    pub(crate) fn needs_another_pass(&self) -> bool {
        !self.align_again.is_empty()
    }

    pub(crate) fn clear_align_again(&mut self) {
        self.align_again.clear();
    }
}
