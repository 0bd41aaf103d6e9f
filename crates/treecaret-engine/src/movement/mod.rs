/*!
 * # Movement engine
 *
 * Step-counted cursor movement over the document tree:
 *
 * - **`filter`**: the shared [`FilterVerdict`] enumeration and the two
 *   filter traits. [`TraversalFilter`] shapes which nodes exist for the
 *   walk at all (the caret-exclusion filter lives here);
 *   [`StepFilter`] decides which visited positions count as semantic
 *   steps. The two are distinct types on purpose: confusing a traversal
 *   filter with a step filter silently changes what "one step" means.
 * - **`iterator`**: [`PositionIterator`], the canonical
 *   (container, offset) walk with forward/backward primitives and
 *   normalizing absolute repositioning.
 * - **`compare`**: total order over two positions, including positions
 *   rooted in ancestor/descendant containers.
 * - **`counter`**: pure step-counting queries over a mover's iterator,
 *   including the budget-guarded count-to-target and visual-line
 *   counting against a [`CaretLayout`].
 * - **`mover`**: [`SelectionMover`] itself — point movement plus the
 *   reconciliation strategy that keeps iterator coordinates valid across
 *   the marker's own insertion/removal.
 */

pub mod compare;
pub mod counter;
pub mod filter;
pub mod iterator;
pub mod mover;

pub use compare::{compare_points, document_order};
pub use counter::{CaretLayout, LoopBudget, LoopBudgetStatus, StepCounter};
pub use filter::{
    AcceptAll, CaretExclusionFilter, CharacterSteps, FilterVerdict, StepFilter, TraversalFilter,
};
pub use iterator::PositionIterator;
pub use mover::{ReconcileStrategy, SelectionMover, StandardReconciler};
