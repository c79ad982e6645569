//! The formatting driver.
//!
//! [`FormatProcessor`] is a small state machine. Each [`step`] does one
//! unit of work:
//!
//! 1. **`AdjustWhiteSpaces`**: process one leaf of the current pass. Per
//!    leaf: spacing, wrap, indent and alignment, then the dependent-spacing
//!    bookkeeping. Wrap and alignment may move the walk back to an earlier
//!    leaf, and a leaf alignment pushed past the right margin is wrapped
//!    again; a dependent rule flipping for the first time restarts the walk
//!    from the first leaf. When the walk falls off the end it either starts
//!    one more pass for deferred dependent rules or moves on.
//! 2. **`ExpandIndents`**: enforce expandable-indent groups.
//! 3. **`ApplyChanges`**: collect the edits.
//!
//! Cancellation is checked at the start of every pass and nowhere else.
//!
//! [`step`]: FormatProcessor::step

use loom_diagnostic::Diagnostic;
use loom_ir::{BlockTree, Document, FormatOptions, TextEdit, TextRange};

use crate::alignment::AlignmentResolver;
use crate::cancel::{CancellationCheck, NeverCancel};
use crate::dependent::{DependentChange, DependentTracker};
use crate::emit::collect_edits;
use crate::expand::ExpandableIndents;
use crate::indent::adjust_indent;
use crate::layout::{Layout, LeafId};
use crate::whitespace::WhiteSpace;
use crate::wrap::WrapResolver;
use crate::FormatError;

/// Stage of a formatting run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    AdjustWhiteSpaces,
    ExpandIndents,
    ApplyChanges,
    Done,
}

/// Counters describing how a run converged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatStats {
    /// Passes started, including the first.
    pub passes: u32,
    /// Passes started because a dependent rule flipped for the first time.
    pub restarts: u32,
    /// Passes started for dependent rules that flipped again.
    pub deferred_passes: u32,
    /// Times the walk moved back to an earlier leaf.
    pub rollbacks: u32,
    /// Alignment groups abandoned because of a proven cycle.
    pub cycles: u32,
}

/// Result of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOutcome {
    /// Replacements in ascending, non-overlapping order.
    pub edits: Vec<TextEdit>,
    /// Rule conflicts that were resolved by abandoning a rule.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: FormatStats,
}

/// Why a pass was started.
#[derive(Copy, Clone, Debug)]
enum PassReason {
    Initial,
    DependentRestart,
    DeferredAlignment,
}

pub struct FormatProcessor<'a> {
    layout: Layout<'a>,
    alignments: AlignmentResolver,
    wraps: WrapResolver,
    dependent: DependentTracker,
    expand: ExpandableIndents,
    cancel: &'a dyn CancellationCheck,
    phase: Phase,
    current: LeafId,
    pass: u32,
    stats: FormatStats,
    edits: Vec<TextEdit>,
}

impl<'a> FormatProcessor<'a> {
    /// Read the original whitespace and set up the resolvers.
    pub fn new(
        tree: &'a BlockTree,
        document: &'a dyn Document,
        options: &'a FormatOptions,
    ) -> Result<Self, FormatError> {
        let layout = Layout::new(tree, document, options)?;
        let alignments = AlignmentResolver::new(tree.alignment_count(), layout.leaf_count());
        let wraps = WrapResolver::new(&layout);
        Ok(FormatProcessor {
            layout,
            alignments,
            wraps,
            dependent: DependentTracker::new(),
            expand: ExpandableIndents::new(),
            cancel: &NeverCancel,
            phase: Phase::AdjustWhiteSpaces,
            current: LeafId::FIRST,
            pass: 0,
            stats: FormatStats::default(),
            edits: Vec::new(),
        })
    }

    /// Only touch whitespace lying fully inside `range`.
    pub fn with_range(mut self, range: TextRange) -> Result<Self, FormatError> {
        let len = self.layout.document().text_len();
        if range.end > len {
            return Err(FormatError::RangeOutOfDocument { range, len });
        }
        self.layout.restrict_to(range);
        Ok(self)
    }

    /// Consult `cancel` at the start of every pass.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: &'a dyn CancellationCheck) -> Self {
        self.cancel = cancel;
        self
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of passes started so far.
    #[inline]
    pub fn pass(&self) -> u32 {
        self.pass
    }

    #[inline]
    pub fn stats(&self) -> FormatStats {
        self.stats
    }

    /// Current whitespace before each leaf, in document order.
    pub fn whitespaces(&self) -> &[WhiteSpace] {
        self.layout.whitespaces()
    }

    /// Do one unit of work and return the phase the run is in afterwards.
    pub fn step(&mut self) -> Result<Phase, FormatError> {
        match self.phase {
            Phase::AdjustWhiteSpaces => {
                if self.pass == 0 {
                    self.start_pass(PassReason::Initial)?;
                }
                if !self.layout.is_end(self.current) {
                    self.process_leaf()?;
                } else if self.dependent.needs_another_pass() {
                    self.dependent.clear_align_again();
                    self.stats.deferred_passes += 1;
                    self.start_pass(PassReason::DeferredAlignment)?;
                } else {
                    tracing::debug!(passes = self.pass, "whitespace settled");
                    self.phase = Phase::ExpandIndents;
                }
            }
            Phase::ExpandIndents => {
                let enforced = self.expand.reconcile(&mut self.layout, &self.alignments);
                tracing::debug!(enforced, "expandable indents reconciled");
                self.phase = Phase::ApplyChanges;
            }
            Phase::ApplyChanges => {
                self.edits = collect_edits(&self.layout);
                self.phase = Phase::Done;
            }
            Phase::Done => {}
        }
        Ok(self.phase)
    }

    /// Run to completion.
    #[tracing::instrument(level = "debug", skip_all, fields(leaves = self.layout.leaf_count()))]
    pub fn run(mut self) -> Result<FormatOutcome, FormatError> {
        while self.step()? != Phase::Done {}
        self.stats.cycles = self.alignments.cycles();
        tracing::debug!(stats = ?self.stats, "formatting finished");
        Ok(FormatOutcome {
            edits: std::mem::take(&mut self.edits),
            diagnostics: self.alignments.take_diagnostics(),
            stats: self.stats,
        })
    }

    fn start_pass(&mut self, reason: PassReason) -> Result<(), FormatError> {
        let pass = self.pass + 1;
        if self.cancel.is_cancelled() {
            tracing::debug!(pass, "cancelled");
            return Err(FormatError::Cancelled { pass });
        }
        self.pass = pass;
        self.stats.passes = pass;
        self.current = LeafId::FIRST;
        self.wraps.start_pass();
        self.alignments.start_pass();
        self.dependent.start_pass();
        tracing::debug!(pass, ?reason, "starting pass");
        Ok(())
    }

    fn roll_back(&mut self, from: LeafId, resume: LeafId, cause: &'static str) {
        tracing::trace!(from = from.raw(), resume = resume.raw(), cause, "rollback");
        self.stats.rollbacks += 1;
        self.wraps.reset_line(&self.layout, resume);
        self.current = resume;
    }

    fn process_leaf(&mut self) -> Result<(), FormatError> {
        let leaf = self.current;

        let triggered = self.dependent.refresh(&self.layout, leaf);
        let spacing = self.layout.spacing(leaf);
        let keep_blank_lines_max = self.layout.indent_options(leaf).keep_blank_lines_max;
        let ws = self.layout.ws_mut(leaf);
        ws.arrange_line_feeds(spacing, triggered, keep_blank_lines_max);
        ws.arrange_spaces(spacing);

        let wrapped = self.wraps.process(&mut self.layout, leaf);
        if let Some(resume) = self.after_break(wrapped) {
            self.roll_back(leaf, resume, "wrap");
            return Ok(());
        }
        if self.layout.ws(leaf).is_line_start() {
            self.expand.register(&self.layout, leaf);
        }
        let shifted = adjust_indent(
            &mut self.layout,
            &mut self.alignments,
            leaf,
            self.expand.enforced(),
        );
        if let Some(resume) = shifted {
            // The leaf before the resume point moved right with the shift.
            let resume = self.recheck_before(resume).unwrap_or(resume);
            self.roll_back(leaf, resume, "alignment");
            return Ok(());
        }
        let moved = self.wraps.recheck(&mut self.layout, leaf);
        if let Some(resume) = self.after_break(moved) {
            self.roll_back(leaf, resume, "aligned past margin");
            return Ok(());
        }
        self.alignments.define_align_offset(&self.layout, leaf);

        self.dependent.register(&self.layout, leaf, self.pass);
        let gap = self.layout.ws(leaf).range();
        match self.dependent.should_reformat(&self.layout, gap, self.pass) {
            DependentChange::Restart => {
                self.stats.restarts += 1;
                return self.start_pass(PassReason::DependentRestart);
            }
            DependentChange::Deferred | DependentChange::Unchanged => {}
        }
        self.current = leaf.next();
        Ok(())
    }

    /// Re-run wrapping for the leaf just before `resume`.
    fn recheck_before(&mut self, resume: LeafId) -> Option<LeafId> {
        let prev = resume.prev()?;
        self.wraps.reset_line(&self.layout, prev);
        let moved = self.wraps.recheck(&mut self.layout, prev);
        self.after_break(moved)
    }

    /// Let alignment forget what a fresh line break invalidated. Returns the
    /// earliest of `resume` and the leaves alignment put back.
    fn after_break(&mut self, resume: Option<LeafId>) -> Option<LeafId> {
        let Some(broken) = self.wraps.take_new_break() else {
            return resume;
        };
        match self.alignments.forget_from(&mut self.layout, broken) {
            Some(stale) => Some(resume.map_or(stale.min(broken), |resume| resume.min(stale))),
            None => resume,
        }
    }
}
