use uuid::Uuid;

use crate::caret::Selection;
use crate::dom::{DocumentTree, Namespace, NodeId, NodeKind, Position};

/// Stable identity of a cursor, so several cursors over one tree stay
/// distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorId(Uuid);

impl CursorId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CursorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification produced by detaching the marker from the tree.
///
/// When the marker sat between two text nodes, removal merges them; the
/// node after the marker survives the merge and grows by `text_growth`
/// characters at its front. Positions held into that node must shift
/// forward by the growth to stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorRemoval {
    pub node_after: Option<NodeId>,
    pub text_growth: usize,
}

/// Result of re-materializing the marker at the selection focus.
#[derive(Debug, Clone, Copy)]
pub struct CursorUpdate {
    /// Removal notification for the previous marker placement, if the
    /// marker was attached when the update started.
    pub removal: Option<CursorRemoval>,
    /// The marker node, freshly attached.
    pub marker: NodeId,
}

/// A cursor: one marker element in [`Namespace::Caret`] plus the owned
/// [`Selection`].
///
/// The marker is a real tree node. Attaching it mid-text splits the text
/// node (the head is carved off in front of the marker, the original node
/// keeps the tail); detaching it merges adjacent text nodes back. Every
/// such mutation is reported to the caller as a value, because the marker's
/// own presence shifts text offsets around it.
#[derive(Debug)]
pub struct Cursor {
    id: CursorId,
    marker: NodeId,
    selection: Selection,
}

impl Cursor {
    /// Create a cursor with a fresh id; the marker starts detached.
    pub fn new(tree: &mut DocumentTree) -> Self {
        Self::with_id(tree, CursorId::new())
    }

    pub fn with_id(tree: &mut DocumentTree, id: CursorId) -> Self {
        let marker = tree.new_element("cursor", Namespace::Caret);
        Self {
            id,
            marker,
            selection: Selection::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CursorId {
        self.id
    }

    /// The marker node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.marker
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Detach the marker, merging the text nodes around it back together.
    ///
    /// Returns `None` when the marker was not attached.
    pub fn remove(&mut self, tree: &mut DocumentTree) -> Option<CursorRemoval> {
        if !tree.is_attached(self.marker) {
            return None;
        }
        let prev = tree.prev_sibling(self.marker);
        let next = tree.next_sibling(self.marker);
        tree.detach(self.marker);
        let mut text_growth = 0;
        if let (Some(a), Some(b)) = (prev, next)
            && tree.kind(a) == NodeKind::Text
            && tree.kind(b) == NodeKind::Text
        {
            text_growth = tree
                .merge_text(a, b)
                .expect("marker neighbors are adjacent text nodes");
        }
        Some(CursorRemoval {
            node_after: next,
            text_growth,
        })
    }

    /// Re-materialize the marker at the selection focus.
    ///
    /// # Panics
    ///
    /// Panics if the selection has never been collapsed, or if the focus
    /// names a position that cannot host the marker; both are integration
    /// errors, not recoverable conditions.
    pub fn update_to_selection(&mut self, tree: &mut DocumentTree) -> CursorUpdate {
        let removal = self.remove(tree);
        let focus = self
            .selection
            .focus()
            .expect("selection must be collapsed before updating the cursor");
        self.attach_at(tree, focus);
        CursorUpdate {
            removal,
            marker: self.marker,
        }
    }

    /// Insert the marker at `position`, splitting a text container when
    /// the offset falls strictly inside it.
    pub fn attach_at(&mut self, tree: &mut DocumentTree, position: Position) {
        let Position { container, offset } = position;
        assert!(
            !tree.is_attached(self.marker),
            "cursor marker is already attached"
        );
        match tree.kind(container) {
            NodeKind::Text => {
                let len = tree.text_len(container);
                assert!(offset <= len, "cursor offset beyond text length");
                if offset == 0 {
                    tree.insert_before(self.marker, container)
                        .expect("text container must be attached");
                } else if offset == len {
                    self.attach_after(tree, container);
                } else {
                    tree.split_text(container, offset)
                        .expect("split offset checked against length");
                    // the head was carved off; the marker slots in before the tail
                    tree.insert_before(self.marker, container)
                        .expect("text container must be attached");
                }
            }
            NodeKind::Element => match tree.child_at(container, offset) {
                Some(child) => tree
                    .insert_before(self.marker, child)
                    .expect("child of an attached container"),
                None => tree
                    .append_child(container, self.marker)
                    .expect("container must be an element"),
            },
        }
    }

    fn attach_after(&mut self, tree: &mut DocumentTree, node: NodeId) {
        match tree.next_sibling(node) {
            Some(next) => tree
                .insert_before(self.marker, next)
                .expect("sibling of an attached node"),
            None => {
                let parent = tree
                    .parent(node)
                    .expect("cursor position names an attached node");
                tree.append_child(parent, self.marker)
                    .expect("parent is an element");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture(text: &str) -> (DocumentTree, NodeId, NodeId) {
        let mut tree = DocumentTree::new();
        let p = tree.new_element("p", Namespace::Document);
        let t = tree.new_text(text);
        tree.append_child(p, t).unwrap();
        (tree, p, t)
    }

    #[test]
    fn attach_mid_text_splits() {
        let (mut tree, p, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.attach_at(&mut tree, Position::new(t, 1));
        let children: Vec<_> = tree.children(p).collect();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.text(children[0]), Some("A"));
        assert_eq!(children[1], cursor.node());
        assert_eq!(children[2], t);
        assert_eq!(tree.text(t), Some("B"));
    }

    #[test]
    fn attach_at_text_edges_does_not_split() {
        let (mut tree, p, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.attach_at(&mut tree, Position::new(t, 0));
        assert_eq!(tree.first_child(p), Some(cursor.node()));
        assert_eq!(tree.text(t), Some("AB"));
        cursor.remove(&mut tree).unwrap();

        cursor.attach_at(&mut tree, Position::new(t, 2));
        assert_eq!(tree.last_child(p), Some(cursor.node()));
        assert_eq!(tree.text(t), Some("AB"));
    }

    #[test]
    fn attach_at_element_gap() {
        let (mut tree, p, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.attach_at(&mut tree, Position::new(p, 0));
        assert_eq!(tree.first_child(p), Some(cursor.node()));
        assert_eq!(tree.next_sibling(cursor.node()), Some(t));
    }

    #[test]
    fn remove_merges_split_text() {
        let (mut tree, p, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.attach_at(&mut tree, Position::new(t, 1));
        let removal = cursor.remove(&mut tree).unwrap();
        assert_eq!(removal.node_after, Some(t));
        assert_eq!(removal.text_growth, 1);
        assert_eq!(tree.text(t), Some("AB"));
        assert_eq!(tree.child_count(p), 1);
    }

    #[test]
    fn remove_without_text_neighbors_reports_no_growth() {
        let (mut tree, _, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.attach_at(&mut tree, Position::new(t, 0));
        let removal = cursor.remove(&mut tree).unwrap();
        assert_eq!(removal.node_after, Some(t));
        assert_eq!(removal.text_growth, 0);
        assert_eq!(cursor.remove(&mut tree), None);
    }

    #[test]
    fn update_to_selection_moves_the_marker() {
        let (mut tree, _, t) = fixture("AB");
        let mut cursor = Cursor::new(&mut tree);
        cursor.selection_mut().collapse(Position::new(t, 1));
        let update = cursor.update_to_selection(&mut tree);
        assert!(update.removal.is_none());
        assert_eq!(update.marker, cursor.node());
        assert_eq!(tree.prev_sibling(t), Some(cursor.node()));

        // moving to the front merges the old split back
        cursor.selection_mut().collapse(Position::new(t, 0));
        let update = cursor.update_to_selection(&mut tree);
        let removal = update.removal.unwrap();
        assert_eq!(removal.node_after, Some(t));
        assert_eq!(removal.text_growth, 1);
        assert_eq!(tree.text(t), Some("AB"));
    }
}
