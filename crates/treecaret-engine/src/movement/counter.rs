use std::ops::{Deref, DerefMut};

use tracing::warn;

use crate::caret::Cursor;
use crate::dom::{DocumentTree, NodeId, Position};
use crate::movement::compare::compare_points;
use crate::movement::filter::{CaretExclusionFilter, FilterVerdict, StepFilter};
use crate::movement::iterator::PositionIterator;
use crate::movement::mover::ReconcileStrategy;

/// Iteration budget for target-seeking traversal. Generous enough for any
/// sane document, small enough to cut a walk over a malformed tree short.
pub(crate) const POSITION_SEARCH_BUDGET: usize = 10_000;

type AdvanceFn = fn(&mut PositionIterator<CaretExclusionFilter>, &DocumentTree) -> bool;

/// Outcome of spending one unit of a [`LoopBudget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBudgetStatus {
    Within,
    Exhausted,
}

/// Explicit iteration budget.
///
/// Exhaustion is a distinguishable outcome rather than a silent cap, so
/// callers can tell a watchdog abort from normal boundary exhaustion.
#[derive(Debug)]
pub struct LoopBudget {
    remaining: usize,
}

impl LoopBudget {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { remaining: limit }
    }

    pub fn spend(&mut self) -> LoopBudgetStatus {
        if self.remaining == 0 {
            LoopBudgetStatus::Exhausted
        } else {
            self.remaining -= 1;
            LoopBudgetStatus::Within
        }
    }
}

/// Rendered caret geometry, consumed for visual-line counting.
///
/// Layout is an external concern; the engine only needs the marker's
/// vertical offset in whatever unit the renderer uses. `None` means the
/// marker is not laid out (no renderer attached, marker detached), which
/// ends a line-counting walk early.
pub trait CaretLayout {
    fn vertical_offset(&self, tree: &DocumentTree, marker: NodeId) -> Option<i32>;
}

/// Restores the iterator position on drop, so counting queries stay pure
/// on every exit path, early returns and watchdog aborts included.
struct PositionGuard<'a, F> {
    iterator: &'a mut PositionIterator<F>,
    saved: Position,
}

impl<'a, F> PositionGuard<'a, F> {
    fn new(iterator: &'a mut PositionIterator<F>) -> Self {
        let saved = iterator.position();
        Self { iterator, saved }
    }

    /// Restore the saved position now; the guard keeps protecting.
    fn rewind(&mut self) {
        self.iterator.restore(self.saved);
    }
}

impl<F> Drop for PositionGuard<'_, F> {
    fn drop(&mut self) {
        self.iterator.restore(self.saved);
    }
}

impl<F> Deref for PositionGuard<'_, F> {
    type Target = PositionIterator<F>;

    fn deref(&self) -> &Self::Target {
        self.iterator
    }
}

impl<F> DerefMut for PositionGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.iterator
    }
}

/// Step-counting queries bound to one mover's iterator.
///
/// Handed out by [`SelectionMover::step_counter`]; every operation leaves
/// the live position untouched from the caller's point of view.
///
/// [`SelectionMover::step_counter`]: crate::movement::SelectionMover::step_counter
pub struct StepCounter<'a> {
    iterator: &'a mut PositionIterator<CaretExclusionFilter>,
    cursor: &'a mut Cursor,
    reconciler: &'a dyn ReconcileStrategy,
}

impl<'a> StepCounter<'a> {
    pub(crate) fn new(
        iterator: &'a mut PositionIterator<CaretExclusionFilter>,
        cursor: &'a mut Cursor,
        reconciler: &'a dyn ReconcileStrategy,
    ) -> Self {
        Self {
            iterator,
            cursor,
            reconciler,
        }
    }

    /// Raw positions traversed while taking up to `steps` accepted steps
    /// forward. The iterator position is restored before returning.
    pub fn count_forward_steps(
        &mut self,
        tree: &DocumentTree,
        steps: usize,
        filter: &dyn StepFilter,
    ) -> usize {
        self.count_steps(tree, steps, filter, PositionIterator::next_position)
    }

    /// Backward counterpart of [`count_forward_steps`](Self::count_forward_steps).
    pub fn count_backward_steps(
        &mut self,
        tree: &DocumentTree,
        steps: usize,
        filter: &dyn StepFilter,
    ) -> usize {
        self.count_steps(tree, steps, filter, PositionIterator::previous_position)
    }

    fn count_steps(
        &mut self,
        tree: &DocumentTree,
        steps: usize,
        filter: &dyn StepFilter,
        advance: AdvanceFn,
    ) -> usize {
        let mut guard = PositionGuard::new(&mut *self.iterator);
        let mut remaining = steps;
        let mut pending = 0;
        let mut count = 0;
        while remaining > 0 && advance(&mut guard, tree) {
            pending += 1;
            if filter.classify(tree, guard.position()) == FilterVerdict::Accept {
                count += pending;
                pending = 0;
                remaining -= 1;
            }
        }
        count
    }

    /// Signed count of accepted positions between the current position and
    /// the (normalized) target: positive when the target lies after the
    /// current position, negative when before.
    ///
    /// The walk is bounded by an internal [`LoopBudget`]; on exhaustion it
    /// aborts, restores the saved position and returns the best-effort
    /// count collected so far.
    pub fn count_steps_to_position(
        &mut self,
        tree: &DocumentTree,
        container: NodeId,
        offset: usize,
        filter: &dyn StepFilter,
    ) -> isize {
        let mut guard = PositionGuard::new(&mut *self.iterator);
        // the iterator may interpret the raw pair differently than the
        // caller; normalize by round-tripping it through set_position
        guard.set_position(tree, container, offset);
        let target = guard.position();
        guard.rewind();
        let origin = guard.position();

        let comparison = compare_points(
            tree,
            target.container,
            target.offset,
            origin.container,
            origin.offset,
        );
        let (advance, delta): (AdvanceFn, isize) = if comparison < 0 {
            (PositionIterator::next_position, 1)
        } else if comparison > 0 {
            (PositionIterator::previous_position, -1)
        } else {
            return 0;
        };

        let mut budget = LoopBudget::new(POSITION_SEARCH_BUDGET);
        let mut steps = 0;
        while advance(&mut guard, tree) {
            if budget.spend() == LoopBudgetStatus::Exhausted {
                warn!(
                    budget = POSITION_SEARCH_BUDGET,
                    "position search exceeded its budget; returning best-effort count"
                );
                break;
            }
            if filter.classify(tree, guard.position()) == FilterVerdict::Accept {
                steps += delta;
            }
            if guard.position() == target {
                break;
            }
        }
        steps
    }

    /// Raw positions traversed to move the caret `lines` visual lines down.
    ///
    /// Each accepted candidate re-materializes the marker so its rendered
    /// vertical offset can be sampled against the baseline captured before
    /// the walk; a changed sample is one line crossed and becomes the new
    /// baseline. The marker ends up back at the original position.
    pub fn count_line_down_steps(
        &mut self,
        tree: &mut DocumentTree,
        lines: usize,
        filter: &dyn StepFilter,
        layout: &dyn CaretLayout,
    ) -> usize {
        self.count_line_steps(tree, lines, filter, layout, PositionIterator::next_position)
    }

    /// Upward counterpart of [`count_line_down_steps`](Self::count_line_down_steps).
    pub fn count_line_up_steps(
        &mut self,
        tree: &mut DocumentTree,
        lines: usize,
        filter: &dyn StepFilter,
        layout: &dyn CaretLayout,
    ) -> usize {
        self.count_line_steps(
            tree,
            lines,
            filter,
            layout,
            PositionIterator::previous_position,
        )
    }

    fn count_line_steps(
        &mut self,
        tree: &mut DocumentTree,
        lines: usize,
        filter: &dyn StepFilter,
        layout: &dyn CaretLayout,
        advance: AdvanceFn,
    ) -> usize {
        // baseline before any candidate move
        let Some(mut baseline) = layout.vertical_offset(tree, self.cursor.node()) else {
            return 0;
        };
        self.detach_marker(tree);
        let origin = self.iterator.position();

        let mut remaining = lines;
        let mut pending = 0;
        let mut count = 0;
        while remaining > 0 && advance(&mut *self.iterator, tree) {
            pending += 1;
            if filter.classify(tree, self.iterator.position()) != FilterVerdict::Accept {
                continue;
            }
            self.materialize_marker_at_iterator(tree);
            let Some(sample) = layout.vertical_offset(tree, self.cursor.node()) else {
                break;
            };
            if sample != baseline {
                count += pending;
                pending = 0;
                remaining -= 1;
                baseline = sample;
            }
        }

        // put everything back where it started
        self.detach_marker(tree);
        self.iterator.set_position(tree, origin.container, origin.offset);
        self.materialize_marker_at_iterator(tree);
        count
    }

    fn detach_marker(&mut self, tree: &mut DocumentTree) {
        if let Some(removal) = self.cursor.remove(tree) {
            self.reconciler
                .on_cursor_detached(tree, &mut *self.iterator, &removal);
        }
    }

    fn materialize_marker_at_iterator(&mut self, tree: &mut DocumentTree) {
        self.detach_marker(tree);
        self.cursor
            .selection_mut()
            .collapse(self.iterator.position());
        let update = self.cursor.update_to_selection(tree);
        self.reconciler
            .on_cursor_attached(tree, &mut *self.iterator, update.marker);
    }
}
