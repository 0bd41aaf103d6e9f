use tracing::debug;

use crate::caret::{Cursor, CursorRemoval};
use crate::dom::{DocumentTree, NodeId, NodeKind, Position};
use crate::movement::counter::StepCounter;
use crate::movement::filter::CaretExclusionFilter;
use crate::movement::iterator::PositionIterator;

type AdvanceFn = fn(&mut PositionIterator<CaretExclusionFilter>, &DocumentTree) -> bool;

/// Hooks invoked around the cursor marker's own tree mutations.
///
/// Inserting or removing the marker splits and merges text nodes, which
/// silently shifts any (container, offset) pair held into those nodes. The
/// mover calls `on_cursor_detached` right after every removal and
/// `on_cursor_attached` right after every insertion so the iterator's
/// saved coordinates can be patched. [`StandardReconciler`] is the default
/// strategy; inject a custom one at construction to layer extra
/// bookkeeping on top.
pub trait ReconcileStrategy {
    fn on_cursor_detached(
        &self,
        tree: &DocumentTree,
        iterator: &mut PositionIterator<CaretExclusionFilter>,
        removal: &CursorRemoval,
    );

    fn on_cursor_attached(
        &self,
        tree: &DocumentTree,
        iterator: &mut PositionIterator<CaretExclusionFilter>,
        marker: NodeId,
    );
}

/// Default reconciliation: the two offset patches described on
/// [`SelectionMover::adapt_to_cursor_removal`] and
/// [`SelectionMover::adapt_to_inserted_cursor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReconciler;

impl ReconcileStrategy for StandardReconciler {
    fn on_cursor_detached(
        &self,
        tree: &DocumentTree,
        iterator: &mut PositionIterator<CaretExclusionFilter>,
        removal: &CursorRemoval,
    ) {
        adapt_to_cursor_removal(tree, iterator, removal);
    }

    fn on_cursor_attached(
        &self,
        tree: &DocumentTree,
        iterator: &mut PositionIterator<CaretExclusionFilter>,
        marker: NodeId,
    ) {
        adapt_to_inserted_cursor(tree, iterator, marker);
    }
}

fn adapt_to_cursor_removal(
    tree: &DocumentTree,
    iterator: &mut PositionIterator<CaretExclusionFilter>,
    removal: &CursorRemoval,
) {
    if removal.text_growth == 0 {
        return;
    }
    let Some(node_after) = removal.node_after else {
        return;
    };
    if tree.kind(node_after) != NodeKind::Text {
        return;
    }
    if iterator.container() == node_after {
        let offset = iterator.offset() + removal.text_growth;
        iterator.set_position(tree, node_after, offset);
    }
}

fn adapt_to_inserted_cursor(
    tree: &DocumentTree,
    iterator: &mut PositionIterator<CaretExclusionFilter>,
    marker: NodeId,
) {
    let container = iterator.container();
    if tree.kind(container) != NodeKind::Text {
        return;
    }
    if tree.prev_sibling(container) != Some(marker) {
        return;
    }
    let Some(head) = tree.prev_sibling(marker) else {
        return;
    };
    let shift = tree.text_len(head);
    if shift > 0 {
        let offset = iterator.offset().saturating_sub(shift);
        iterator.set_position(tree, container, offset);
    }
}

/// Moves one cursor's point selection through the document by counted
/// positions.
///
/// Owns the cursor, the filtered iterator and the reconciliation strategy.
/// Construction places the caret at the start of the traversable range:
/// the iterator is positioned there, the selection collapsed onto it and
/// the marker materialized.
pub struct SelectionMover {
    cursor: Cursor,
    iterator: PositionIterator<CaretExclusionFilter>,
    reconciler: Box<dyn ReconcileStrategy>,
}

impl SelectionMover {
    pub fn new(cursor: Cursor, tree: &mut DocumentTree, root: NodeId) -> Self {
        Self::with_reconciler(cursor, tree, root, Box::new(StandardReconciler))
    }

    pub fn with_reconciler(
        mut cursor: Cursor,
        tree: &mut DocumentTree,
        root: NodeId,
        reconciler: Box<dyn ReconcileStrategy>,
    ) -> Self {
        let mut iterator = Self::create_position_iterator(tree, root);
        cursor.selection_mut().collapse(iterator.position());
        let update = cursor.update_to_selection(tree);
        if let Some(removal) = update.removal {
            reconciler.on_cursor_detached(tree, &mut iterator, &removal);
        }
        reconciler.on_cursor_attached(tree, &mut iterator, update.marker);
        Self {
            cursor,
            iterator,
            reconciler,
        }
    }

    /// Filtered position iterator over the subtree under `root`, with the
    /// caret-exclusion filter installed.
    pub fn create_position_iterator(
        tree: &DocumentTree,
        root: NodeId,
    ) -> PositionIterator<CaretExclusionFilter> {
        PositionIterator::new(tree, root, CaretExclusionFilter)
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The live position the next movement starts from.
    #[must_use]
    pub fn position(&self) -> Position {
        self.iterator.position()
    }

    /// Move the point selection up to `steps` raw filtered positions
    /// forward. Returns the positions actually traversed; running off the
    /// end of the range is a normal boundary condition, visible only as a
    /// short count.
    pub fn move_point_forward(&mut self, tree: &mut DocumentTree, steps: usize) -> usize {
        self.do_move(tree, steps, PositionIterator::next_position)
    }

    /// Backward counterpart of [`move_point_forward`](Self::move_point_forward).
    pub fn move_point_backward(&mut self, tree: &mut DocumentTree, steps: usize) -> usize {
        self.do_move(tree, steps, PositionIterator::previous_position)
    }

    fn do_move(&mut self, tree: &mut DocumentTree, steps: usize, advance: AdvanceFn) -> usize {
        if let Some(removal) = self.cursor.remove(tree) {
            self.reconciler
                .on_cursor_detached(tree, &mut self.iterator, &removal);
        }
        let mut left = steps;
        while left > 0 && advance(&mut self.iterator, tree) {
            left -= 1;
        }
        // collapse even when nothing moved: the caller asked for the caret
        // to be re-materialized at the reached position
        self.cursor
            .selection_mut()
            .collapse(self.iterator.position());
        let update = self.cursor.update_to_selection(tree);
        debug_assert!(
            update.removal.is_none(),
            "marker was detached before movement"
        );
        self.reconciler
            .on_cursor_attached(tree, &mut self.iterator, update.marker);
        let moved = steps - left;
        debug!(requested = steps, moved, "point moved");
        moved
    }

    /// Step-counting queries bound to this mover's iterator.
    pub fn step_counter(&mut self) -> StepCounter<'_> {
        StepCounter::new(&mut self.iterator, &mut self.cursor, &*self.reconciler)
    }

    /// Patch the iterator after a marker removal merged text into
    /// `removal.node_after`: a position held in that node shifts forward
    /// by the growth.
    pub fn adapt_to_cursor_removal(&mut self, tree: &DocumentTree, removal: &CursorRemoval) {
        adapt_to_cursor_removal(tree, &mut self.iterator, removal);
    }

    /// Patch the iterator after a marker insertion split its container:
    /// when the container is the text node right after the marker, the
    /// offset shifts back by the length of the carved-off head.
    pub fn adapt_to_inserted_cursor(&mut self, tree: &DocumentTree, marker: NodeId) {
        adapt_to_inserted_cursor(tree, &mut self.iterator, marker);
    }
}
