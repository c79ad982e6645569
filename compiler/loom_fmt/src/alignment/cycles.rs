//! Rollback accounting for backward alignment.
//!
//! Every backward shift moves an anchor right and rolls the walk back to the
//! leaf after it. Shifts that keep growing the same anchors never settle, so
//! once the number of growing rollbacks in one pass exceeds the number of
//! leaves the resolver has proof of a loop and abandons the alignment.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::layout::LeafId;

#[derive(Clone, Debug)]
pub(crate) struct CycleDetector {
    leaf_count: usize,
    anchor: Option<LeafId>,
    before_total_spaces: u32,
    rollbacks: usize,
    rollback_targets: FxHashSet<LeafId>,
    registrations: FxHashMap<LeafId, u32>,
}

impl CycleDetector {
    pub(crate) fn new(leaf_count: usize) -> Self {
        CycleDetector {
            leaf_count,
            anchor: None,
            before_total_spaces: 0,
            rollbacks: 0,
            rollback_targets: FxHashSet::default(),
            registrations: FxHashMap::default(),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.anchor = None;
        self.before_total_spaces = 0;
        self.rollbacks = 0;
        self.rollback_targets.clear();
        self.registrations.clear();
    }

    /// Record the anchor about to be shifted and its gap width before the shift.
    pub(crate) fn register_anchor(&mut self, anchor: LeafId, total_spaces: u32) {
        self.anchor = Some(anchor);
        self.before_total_spaces = total_spaces;
        *self.registrations.entry(anchor).or_insert(0) += 1;
    }

    /// Record a rollback to `target` now that the anchor's gap is
    /// `total_spaces` wide. Returns whether the rollbacks prove a cycle.
    pub(crate) fn register_rollback(&mut self, target: LeafId, total_spaces: u32) -> bool {
        if self.anchor.is_none() {
            return false;
        }
        if total_spaces > self.before_total_spaces {
            self.rollbacks += 1;
        }
        self.rollback_targets.insert(target);
        self.is_cycle_detected()
    }

    #[inline]
    pub(crate) fn is_cycle_detected(&self) -> bool {
        self.rollbacks > self.leaf_count
    }

    pub(crate) fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    /// Number of distinct leaves the walk was rolled back to.
    pub(crate) fn distinct_targets(&self) -> usize {
        self.rollback_targets.len()
    }

    /// How many times `anchor` was shifted this pass.
    pub(crate) fn registrations(&self, anchor: LeafId) -> u32 {
        self.registrations.get(&anchor).copied().unwrap_or(0)
    }
}
