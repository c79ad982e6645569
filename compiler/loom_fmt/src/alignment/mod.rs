//! Alignment resolution.
//!
//! Members of an alignment group must start at the same column. Members are
//! registered as the walk passes them; when a later member is positioned, an
//! earlier member on another line is chosen as its anchor and the member is
//! moved to the anchor's column.
//!
//! When the member cannot move left far enough, a group that allows backward
//! shifting moves the anchor right instead and asks the driver to resume the
//! walk just after the anchor. Two safeguards bound those rollbacks:
//!
//! - a member that already caused its anchor to shift and needs another
//!   shift means the two are pushing each other; the group is abandoned and
//!   the walk resumes at the anchor;
//! - [`CycleDetector`] counts growing rollbacks across the pass and abandons
//!   the group once they exceed the number of leaves.
//!
//! Abandoning a group puts every leaf alignment moved back where it was
//! before its first move. Abandoned groups stay abandoned for the rest of the run and are
//! reported as diagnostics, unless a later line break lands at or before
//! the member that gave up: the lines the group saw no longer exist, so it
//! gets another chance. The same break also undoes anchor shifts caused by
//! members past it.

mod cycles;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use loom_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use loom_ir::AlignmentId;

use crate::layout::{Layout, LeafId};

use cycles::CycleDetector;

/// Result of positioning one leaf against its alignment group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AlignmentOutcome {
    /// No anchor yet, or the group may not shift earlier members.
    NotAligned,
    /// The leaf now starts at its anchor's column.
    AlignedForward,
    /// The anchor moved right; the walk resumes at `resume`.
    AlignedBackward { resume: LeafId },
    /// The leaf and its anchor keep shifting each other; the group is
    /// abandoned and the walk resumes at the anchor or at the earliest leaf
    /// put back, whichever comes first.
    RecursionDetected { resume: LeafId },
    /// The anchor is the first leaf or its whitespace is read-only; the
    /// group is abandoned. The walk resumes at the earliest leaf put back,
    /// if any.
    UnableToAlignBackward { resume: Option<LeafId> },
    /// Rollbacks exceeded the leaf count; the group is abandoned.
    CycleDetected { resume: LeafId },
}

impl AlignmentOutcome {
    /// Leaf the walk must resume at, if any.
    pub(crate) fn rollback(self) -> Option<LeafId> {
        match self {
            AlignmentOutcome::AlignedBackward { resume }
            | AlignmentOutcome::RecursionDetected { resume }
            | AlignmentOutcome::CycleDetected { resume } => Some(resume),
            AlignmentOutcome::UnableToAlignBackward { resume } => resume,
            AlignmentOutcome::NotAligned | AlignmentOutcome::AlignedForward => None,
        }
    }
}

/// Why a group was given up, kept until the run ends or the group revives.
struct Abandonment {
    /// Member that could not be aligned.
    target: LeafId,
    /// Reported at the end of the run if the group is still abandoned.
    diagnostic: Option<Diagnostic>,
}

pub(crate) struct AlignmentResolver {
    /// Members registered this pass, per group, in document order.
    members: Vec<Vec<LeafId>>,
    /// Abandoned groups, by group index.
    abandoned: Vec<Option<Abandonment>>,
    /// Anchor shifted by the latest backward alignment, and the leaves that
    /// caused it.
    backward_shifted: FxHashMap<LeafId, FxHashSet<LeafId>>,
    /// `(spaces, indent_spaces)` of every leaf alignment moved, taken before
    /// its first move. Survives passes.
    before_alignment: FxHashMap<LeafId, (u32, u32)>,
    /// Shifted anchor to the members that shifted it.
    shift_causes: FxHashMap<LeafId, SmallVec<[LeafId; 2]>>,
    /// Aligned leaf to the anchors it was aligned to.
    dependencies: FxHashMap<LeafId, SmallVec<[LeafId; 2]>>,
    detector: CycleDetector,
    diagnostics: DiagnosticQueue,
}

impl AlignmentResolver {
    pub(crate) fn new(alignment_count: usize, leaf_count: usize) -> Self {
        AlignmentResolver {
            members: vec![Vec::new(); alignment_count],
            abandoned: (0..alignment_count).map(|_| None).collect(),
            backward_shifted: FxHashMap::default(),
            before_alignment: FxHashMap::default(),
            shift_causes: FxHashMap::default(),
            dependencies: FxHashMap::default(),
            detector: CycleDetector::new(leaf_count),
            diagnostics: DiagnosticQueue::new(),
        }
    }

    /// Forget per-pass state. Abandoned groups stay abandoned.
    pub(crate) fn start_pass(&mut self) {
        for members in &mut self.members {
            members.clear();
        }
        self.backward_shifted.clear();
        self.dependencies.clear();
        self.detector.reset();
    }

    #[inline]
    pub(crate) fn is_skipped(&self, alignment: AlignmentId) -> bool {
        self.abandoned[alignment.index()].is_some()
    }

    /// Group that positions `leaf`: the innermost one, unless abandoned.
    pub(crate) fn active_alignment(&self, layout: &Layout<'_>, leaf: LeafId) -> Option<AlignmentId> {
        layout
            .alignments(leaf)
            .first()
            .copied()
            .filter(|&alignment| !self.is_skipped(alignment))
    }

    /// Number of groups abandoned because of a proven cycle.
    pub(crate) fn cycles(&self) -> u32 {
        let cycles = self
            .abandoned
            .iter()
            .flatten()
            .filter_map(|abandonment| abandonment.diagnostic.as_ref())
            .filter(|diag| diag.code == ErrorCode::F0001)
            .count();
        u32::try_from(cycles).unwrap_or(u32::MAX)
    }

    /// Diagnostics of the groups that ended the run abandoned.
    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        for abandonment in self.abandoned.iter_mut().flatten() {
            if let Some(diag) = abandonment.diagnostic.take() {
                self.diagnostics.add(diag);
            }
        }
        self.diagnostics.flush()
    }

    /// Register `leaf` as a member of every live group starting at it.
    pub(crate) fn define_align_offset(&mut self, layout: &Layout<'_>, leaf: LeafId) {
        for &alignment in layout.alignments(leaf) {
            if self.is_skipped(alignment) {
                continue;
            }
            let members = &mut self.members[alignment.index()];
            if let Err(pos) = members.binary_search(&leaf) {
                members.insert(pos, leaf);
            }
        }
    }

    /// Member `target` aligns to: among registered members before it on
    /// other lines, the last one that starts a line, else the first one.
    pub(crate) fn anchor(
        &self,
        layout: &Layout<'_>,
        alignment: AlignmentId,
        target: LeafId,
    ) -> Option<LeafId> {
        let mut first = None;
        let mut line_start = None;
        for &member in &self.members[alignment.index()] {
            if member >= target {
                break;
            }
            if !layout.on_different_lines(member, target) {
                continue;
            }
            first.get_or_insert(member);
            if layout.ws(member).is_line_start() {
                line_start = Some(member);
            }
        }
        line_start.or(first)
    }

    /// Move `target` to its anchor's column, shifting the anchor right when
    /// the group allows it and `target` cannot move left far enough.
    #[tracing::instrument(level = "trace", skip_all, fields(alignment = alignment.raw(), target = target.raw()))]
    pub(crate) fn apply_alignment(
        &mut self,
        layout: &mut Layout<'_>,
        alignment: AlignmentId,
        target: LeafId,
    ) -> AlignmentOutcome {
        if layout.ws(target).is_read_only() {
            return AlignmentOutcome::NotAligned;
        }
        let Some(anchor) = self.anchor(layout, alignment, target) else {
            return AlignmentOutcome::NotAligned;
        };
        let anchor_column = layout.start_column(anchor);
        let Some(needed) = forward_spaces(layout, target, anchor_column) else {
            return self.align_backward(layout, alignment, target, anchor, anchor_column);
        };
        self.remember(layout, target);
        place(layout, target, anchor_column, needed);
        self.record_dependency(anchor, target);
        AlignmentOutcome::AlignedForward
    }

    /// Align `target` if that only moves it; never shifts the anchor.
    pub(crate) fn align_forward(
        &self,
        layout: &mut Layout<'_>,
        alignment: AlignmentId,
        target: LeafId,
    ) -> bool {
        if layout.ws(target).is_read_only() {
            return false;
        }
        let Some(anchor) = self.anchor(layout, alignment, target) else {
            return false;
        };
        let anchor_column = layout.start_column(anchor);
        let Some(needed) = forward_spaces(layout, target, anchor_column) else {
            return false;
        };
        place(layout, target, anchor_column, needed);
        true
    }

    fn align_backward(
        &mut self,
        layout: &mut Layout<'_>,
        alignment: AlignmentId,
        target: LeafId,
        anchor: LeafId,
        anchor_column: u32,
    ) -> AlignmentOutcome {
        if !layout.tree().alignment(alignment).allow_backward_shift {
            return AlignmentOutcome::NotAligned;
        }
        if anchor == LeafId::FIRST || layout.ws(anchor).is_read_only() {
            // Spaces before the first leaf would move every line start.
            tracing::debug!(anchor = anchor.raw(), "anchor cannot move; alignment abandoned");
            let resume = self.abandon(layout, alignment, target, anchor, None);
            return AlignmentOutcome::UnableToAlignBackward { resume };
        }
        if self
            .backward_shifted
            .get(&anchor)
            .is_some_and(|causes| causes.contains(&target))
        {
            tracing::warn!(
                anchor = anchor.raw(),
                target = target.raw(),
                "recursive backward alignment; alignment abandoned"
            );
            let restored = self.abandon(layout, alignment, target, anchor, Some(ErrorCode::F0002));
            let resume = restored.map_or(anchor, |leaf| leaf.min(anchor));
            return AlignmentOutcome::RecursionDetected { resume };
        }

        let ws = layout.ws(target);
        let wanted = layout.start_column(target) - ws.spaces() + min_spaces(layout, target);
        let diff = wanted.saturating_sub(anchor_column);
        self.detector
            .register_anchor(anchor, layout.ws(anchor).total_spaces());
        self.remember(layout, anchor);
        let anchor_ws = layout.ws(anchor);
        let (spaces, indent) = (anchor_ws.spaces() + diff, anchor_ws.indent_spaces());
        layout.ws_mut(anchor).set_spaces(spaces, indent);

        self.backward_shifted.clear();
        self.backward_shifted
            .entry(anchor)
            .or_default()
            .insert(target);
        let causes = self.shift_causes.entry(anchor).or_default();
        if !causes.contains(&target) {
            causes.push(target);
        }
        self.record_dependency(anchor, target);

        let resume = anchor.next();
        let after = layout.ws(anchor).total_spaces();
        if self.detector.register_rollback(resume, after) {
            tracing::warn!(
                anchor = anchor.raw(),
                rollbacks = self.detector.rollbacks(),
                "alignment cycle detected; alignment abandoned"
            );
            let restored = self.abandon(layout, alignment, target, anchor, Some(ErrorCode::F0001));
            let resume = restored.map_or(anchor, |leaf| leaf.min(anchor));
            return AlignmentOutcome::CycleDetected { resume };
        }
        tracing::trace!(anchor = anchor.raw(), diff, "anchor shifted right");
        AlignmentOutcome::AlignedBackward { resume }
    }

    /// Note where `leaf` sat before alignment first moved it.
    fn remember(&mut self, layout: &Layout<'_>, leaf: LeafId) {
        let ws = layout.ws(leaf);
        self.before_alignment
            .entry(leaf)
            .or_insert((ws.spaces(), ws.indent_spaces()));
    }

    /// Give up on `alignment` and put back every leaf alignment moved.
    /// Returns the earliest leaf put back.
    fn abandon(
        &mut self,
        layout: &mut Layout<'_>,
        alignment: AlignmentId,
        target: LeafId,
        anchor: LeafId,
        code: Option<ErrorCode>,
    ) -> Option<LeafId> {
        let diagnostic = match code {
            Some(code) => Some(self.diagnostic(layout, code, target, anchor)),
            None => None,
        };
        self.abandoned[alignment.index()] = Some(Abandonment { target, diagnostic });
        let mut earliest: Option<LeafId> = None;
        for (leaf, (spaces, indent)) in self.before_alignment.drain() {
            layout.ws_mut(leaf).set_spaces(spaces, indent);
            earliest = Some(earliest.map_or(leaf, |first| first.min(leaf)));
        }
        self.shift_causes.clear();
        self.backward_shifted.clear();
        self.detector.reset();
        earliest
    }

    /// A line break was just placed before `broken`. Revive the groups that
    /// gave up at or after it and undo the anchor shifts members at or after
    /// it caused. Returns the earliest leaf the walk must revisit.
    pub(crate) fn forget_from(&mut self, layout: &mut Layout<'_>, broken: LeafId) -> Option<LeafId> {
        let mut resume: Option<LeafId> = None;
        let mut earliest = |leaf: LeafId| {
            resume = Some(resume.map_or(leaf, |first: LeafId| first.min(leaf)));
        };

        for (index, slot) in self.abandoned.iter_mut().enumerate() {
            if !slot.as_ref().is_some_and(|abandonment| abandonment.target >= broken) {
                continue;
            }
            *slot = None;
            tracing::trace!(alignment = index, broken = broken.raw(), "alignment revived");
            let first = layout
                .leaf_ids()
                .find(|&leaf| layout.alignments(leaf).iter().any(|a| a.index() == index));
            if let Some(first) = first {
                earliest(first);
            }
        }

        let mut stale: SmallVec<[LeafId; 4]> = self
            .shift_causes
            .iter()
            .filter(|(_, causes)| causes.iter().any(|&cause| cause >= broken))
            .map(|(&anchor, _)| anchor)
            .collect();
        stale.sort_unstable();
        for &anchor in &stale {
            self.shift_causes.remove(&anchor);
            if let Some((spaces, indent)) = self.before_alignment.remove(&anchor) {
                layout.ws_mut(anchor).set_spaces(spaces, indent);
            }
        }
        if let Some(&first) = stale.first() {
            tracing::trace!(anchor = first.raw(), broken = broken.raw(), "anchor shift undone");
            self.backward_shifted.clear();
            self.detector.reset();
            earliest(first);
        }
        resume
    }

    fn record_dependency(&mut self, anchor: LeafId, target: LeafId) {
        let anchors = self.dependencies.entry(target).or_default();
        if !anchors.contains(&anchor) {
            anchors.push(anchor);
        }
    }

    /// Anchors reachable from `start` through recorded alignments.
    fn dependency_chain(&self, start: LeafId) -> Vec<LeafId> {
        let mut seen = FxHashSet::default();
        let mut chain = Vec::new();
        let mut stack = vec![start];
        while let Some(leaf) = stack.pop() {
            if !seen.insert(leaf) {
                continue;
            }
            if let Some(anchors) = self.dependencies.get(&leaf) {
                for &anchor in anchors {
                    chain.push(anchor);
                    stack.push(anchor);
                }
            }
        }
        chain
    }

    fn diagnostic(
        &self,
        layout: &Layout<'_>,
        code: ErrorCode,
        target: LeafId,
        anchor: LeafId,
    ) -> Diagnostic {
        let mut diag = Diagnostic::warning(code)
            .with_label(layout.leaf_range(target), "this block could not be aligned")
            .with_secondary_label(layout.leaf_range(anchor), "alignment anchor");
        for leaf in self.dependency_chain(anchor) {
            diag = diag.with_secondary_label(layout.leaf_range(leaf), "aligned to this block");
        }
        if let Some(language) = layout.language_name(target) {
            diag = diag.with_language(language);
        }
        if code == ErrorCode::F0001 {
            diag = diag.with_note(format!(
                "{} growing rollbacks over {} blocks; anchor shifted {} times",
                self.detector.rollbacks(),
                self.detector.distinct_targets(),
                self.detector.registrations(anchor),
            ));
        }
        let document = layout.document();
        let line = |leaf: LeafId| document.line_number(layout.leaf_range(leaf).start) + 1;
        diag.with_note(format!(
            "block on line {} aligns to a block on line {}",
            line(target),
            line(anchor)
        ))
        .with_attachment("document.txt", document.text())
    }
}

/// Spaces that put `target` at `column`, or `None` when it would have to
/// come closer to the previous leaf than its spacing allows. A line start
/// can always reach the column.
fn forward_spaces(layout: &Layout<'_>, target: LeafId, column: u32) -> Option<u32> {
    let ws = layout.ws(target);
    if ws.is_line_start() {
        return Some(column);
    }
    let base = layout.start_column(target) - ws.spaces();
    let min = min_spaces(layout, target);
    column.checked_sub(base).filter(|&needed| needed >= min)
}

fn place(layout: &mut Layout<'_>, target: LeafId, column: u32, spaces: u32) {
    let ws = layout.ws_mut(target);
    if ws.is_line_start() {
        ws.set_column(column);
    } else {
        ws.set_spaces(spaces, 0);
    }
}

/// Narrowest single-line gap allowed before `leaf`.
fn min_spaces(layout: &Layout<'_>, leaf: LeafId) -> u32 {
    match layout.spacing(leaf) {
        Some(spacing) => spacing.min_spaces(),
        None => u32::from(layout.ws(leaf).spaces() > 0),
    }
}
