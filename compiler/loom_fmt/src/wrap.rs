//! Wrap resolution.
//!
//! Decides, per leaf, whether a line break is forced before it: by an
//! `Always` group, by a `ChopDownIfLong` group that has already broken, or
//! because the leaf ends past the right margin. In the last case the break
//! goes before the latest wrappable leaf on the line, which may be behind
//! the current one; the walk then resumes there.

use rustc_hash::FxHashSet;

use loom_ir::{Spacing, WrapId, WrapKind};

use crate::layout::{Layout, LeafId};

pub(crate) struct WrapResolver {
    /// First leaf of each wrap group in document order.
    first_member: Vec<Option<LeafId>>,
    /// Chop-down groups that broke this pass.
    active_chop: FxHashSet<WrapId>,
    /// Leaves that must break for the rest of the pass.
    forced: FxHashSet<LeafId>,
    /// Latest leaf on the current line a break may go before.
    candidate: Option<LeafId>,
    /// Earliest leaf that got its first forced break since the last
    /// [`take_new_break`](Self::take_new_break).
    new_break: Option<LeafId>,
}

impl WrapResolver {
    pub(crate) fn new(layout: &Layout<'_>) -> Self {
        let mut first_member = vec![None; layout.tree().wrap_count()];
        for leaf in layout.leaf_ids() {
            for &wrap in layout.wraps(leaf) {
                first_member[wrap.index()].get_or_insert(leaf);
            }
        }
        WrapResolver {
            first_member,
            active_chop: FxHashSet::default(),
            forced: FxHashSet::default(),
            candidate: None,
            new_break: None,
        }
    }

    pub(crate) fn start_pass(&mut self) {
        self.active_chop.clear();
        self.forced.clear();
        self.candidate = None;
        self.new_break = None;
    }

    /// Force or record a break before `leaf`. Returns the leaf the walk must
    /// resume at when the break went before an earlier leaf.
    pub(crate) fn process(&mut self, layout: &mut Layout<'_>, leaf: LeafId) -> Option<LeafId> {
        if layout.ws(leaf).is_line_start() {
            self.start_line(layout, leaf);
            return None;
        }
        if self.must_wrap(layout, leaf) && layout.ws(leaf).can_take_line_feed() {
            self.break_before(layout, leaf);
            return None;
        }
        if self.is_wrappable(layout, leaf) {
            self.candidate = Some(leaf);
        }
        if layout.end_column(leaf) <= layout.options().right_margin {
            return None;
        }
        let candidate = self.candidate?;
        // A chop group breaking for the first time also breaks the members
        // already passed, so the walk goes back to the group's start.
        let chopped = layout.wraps(candidate).iter().copied().find(|&wrap| {
            layout.tree().wrap(wrap).kind == WrapKind::ChopDownIfLong
                && !self.is_exempt(layout, wrap, candidate)
                && !self.active_chop.contains(&wrap)
        });
        self.break_before(layout, candidate);
        let resume = chopped
            .and_then(|wrap| self.first_member[wrap.index()])
            .map_or(candidate, |first| first.min(candidate));
        if resume == leaf {
            return None;
        }
        tracing::trace!(
            leaf = leaf.raw(),
            candidate = candidate.raw(),
            resume = resume.raw(),
            "line too long; wrapping earlier leaf"
        );
        Some(resume)
    }

    /// Run [`process`](Self::process) again for a leaf that moved right
    /// after it was processed. Returns the leaf to resume at, which is
    /// `leaf` itself when the break went before it.
    pub(crate) fn recheck(&mut self, layout: &mut Layout<'_>, leaf: LeafId) -> Option<LeafId> {
        if layout.ws(leaf).is_line_start()
            || layout.end_column(leaf) <= layout.options().right_margin
        {
            return None;
        }
        self.process(layout, leaf)
            .or_else(|| layout.ws(leaf).is_line_start().then_some(leaf))
    }

    /// Earliest leaf broken for the first time this pass since the last call.
    pub(crate) fn take_new_break(&mut self) -> Option<LeafId> {
        self.new_break.take()
    }

    /// Recompute the wrap candidate after the walk was moved back to `resume`.
    pub(crate) fn reset_line(&mut self, layout: &Layout<'_>, resume: LeafId) {
        self.candidate = None;
        let mut leaf = layout.line_start(resume);
        while leaf < resume {
            if !layout.ws(leaf).is_line_start() && self.is_wrappable(layout, leaf) {
                self.candidate = Some(leaf);
            }
            leaf = leaf.next();
        }
    }

    fn start_line(&mut self, layout: &Layout<'_>, leaf: LeafId) {
        self.activate_chops(layout, leaf);
        self.candidate = None;
    }

    fn break_before(&mut self, layout: &mut Layout<'_>, leaf: LeafId) {
        layout.ws_mut(leaf).set_line_feeds(1);
        if self.forced.insert(leaf) {
            self.new_break = Some(self.new_break.map_or(leaf, |first| first.min(leaf)));
        }
        self.start_line(layout, leaf);
    }

    fn activate_chops(&mut self, layout: &Layout<'_>, leaf: LeafId) {
        for &wrap in layout.wraps(leaf) {
            if layout.tree().wrap(wrap).kind == WrapKind::ChopDownIfLong
                && !self.is_exempt(layout, wrap, leaf)
            {
                self.active_chop.insert(wrap);
            }
        }
    }

    /// The first member of a group is spared unless the group wraps it too.
    fn is_exempt(&self, layout: &Layout<'_>, wrap: WrapId, leaf: LeafId) -> bool {
        self.first_member[wrap.index()] == Some(leaf) && !layout.tree().wrap(wrap).wrap_first_element
    }

    fn must_wrap(&self, layout: &Layout<'_>, leaf: LeafId) -> bool {
        if self.forced.contains(&leaf) {
            return true;
        }
        layout.wraps(leaf).iter().any(|&wrap| {
            !self.is_exempt(layout, wrap, leaf)
                && match layout.tree().wrap(wrap).kind {
                    WrapKind::Always => true,
                    WrapKind::ChopDownIfLong => self.active_chop.contains(&wrap),
                    WrapKind::None | WrapKind::Normal => false,
                }
        })
    }

    fn is_wrappable(&self, layout: &Layout<'_>, leaf: LeafId) -> bool {
        let ws = layout.ws(leaf);
        if !ws.can_take_line_feed() || !layout.spacing(leaf).map_or(true, Spacing::is_safe) {
            return false;
        }
        layout.wraps(leaf).iter().any(|&wrap| match layout.tree().wrap(wrap).kind {
            WrapKind::Normal => true,
            WrapKind::ChopDownIfLong => !self.is_exempt(layout, wrap, leaf),
            WrapKind::None | WrapKind::Always => false,
        })
    }
}
