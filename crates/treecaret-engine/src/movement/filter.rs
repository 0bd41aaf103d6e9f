use crate::dom::{DocumentTree, Namespace, NodeId, NodeKind, Position};

/// Verdict shared by both filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    /// Visit and, for step filters, count as one semantic step.
    Accept,
    /// Visit without counting.
    Skip,
    /// Do not descend into the node's subtree.
    RejectSubtree,
}

/// Shapes the raw traversal: which nodes exist for the walk.
///
/// Any verdict other than [`FilterVerdict::Accept`] hides the node and its
/// subtree — hidden nodes contribute no positions and no child gaps.
pub trait TraversalFilter {
    fn classify_node(&self, tree: &DocumentTree, node: NodeId) -> FilterVerdict;
}

/// Decides step semantics at positions the traversal already visited.
///
/// Supplied per call, so different movement granularities (visible
/// character, word boundary, ...) can share one iterator.
pub trait StepFilter {
    fn classify(&self, tree: &DocumentTree, position: Position) -> FilterVerdict;
}

/// Hides cursor marker nodes from traversal.
///
/// Markers live in [`Namespace::Caret`]; rejecting the whole subtree
/// guarantees the walk is identical whether or not a marker happens to be
/// present at the traversal point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaretExclusionFilter;

impl TraversalFilter for CaretExclusionFilter {
    fn classify_node(&self, tree: &DocumentTree, node: NodeId) -> FilterVerdict {
        if tree.namespace(node) == Some(Namespace::Caret) {
            FilterVerdict::RejectSubtree
        } else {
            FilterVerdict::Accept
        }
    }
}

/// Step filter counting every raw position.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl StepFilter for AcceptAll {
    fn classify(&self, _tree: &DocumentTree, _position: Position) -> FilterVerdict {
        FilterVerdict::Accept
    }
}

/// Step filter counting character boundaries only: positions inside text
/// containers are steps, element gaps are visited but skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterSteps;

impl StepFilter for CharacterSteps {
    fn classify(&self, tree: &DocumentTree, position: Position) -> FilterVerdict {
        match tree.kind(position.container) {
            NodeKind::Text => FilterVerdict::Accept,
            NodeKind::Element => FilterVerdict::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_namespace_is_rejected() {
        let mut tree = DocumentTree::new();
        let p = tree.new_element("p", Namespace::Document);
        let marker = tree.new_element("cursor", Namespace::Caret);
        let text = tree.new_text("x");
        let filter = CaretExclusionFilter;
        assert_eq!(
            filter.classify_node(&tree, p),
            FilterVerdict::Accept
        );
        assert_eq!(
            filter.classify_node(&tree, marker),
            FilterVerdict::RejectSubtree
        );
        assert_eq!(
            filter.classify_node(&tree, text),
            FilterVerdict::Accept
        );
    }

    #[test]
    fn character_steps_skip_element_gaps() {
        let mut tree = DocumentTree::new();
        let p = tree.new_element("p", Namespace::Document);
        let t = tree.new_text("ab");
        tree.append_child(p, t).unwrap();
        let filter = CharacterSteps;
        assert_eq!(
            filter.classify(&tree, Position::new(t, 1)),
            FilterVerdict::Accept
        );
        assert_eq!(
            filter.classify(&tree, Position::new(p, 0)),
            FilterVerdict::Skip
        );
    }
}
