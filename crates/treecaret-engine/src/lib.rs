pub mod caret;
pub mod dom;
pub mod movement;

// Re-export key types for easier usage
pub use caret::{Cursor, CursorId, CursorRemoval, CursorUpdate, Selection};
pub use dom::{DocumentTree, Namespace, NodeId, NodeKind, NodeRelation, Position, TreeError};
pub use movement::{
    AcceptAll, CaretExclusionFilter, CaretLayout, CharacterSteps, FilterVerdict, LoopBudget,
    LoopBudgetStatus, PositionIterator, ReconcileStrategy, SelectionMover, StandardReconciler,
    StepCounter, StepFilter, TraversalFilter, compare_points, document_order,
};
