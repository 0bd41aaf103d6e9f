use crate::dom::{DocumentTree, NodeId, NodeKind, Position};
use crate::movement::filter::{FilterVerdict, TraversalFilter};

/// Filtered position iterator: one mutable (container, offset) walked over
/// the canonical position set of the subtree under `root`.
///
/// The canonical set is, in document order: for every visible text node,
/// its character boundaries; for every visible element, a gap at the raw
/// child index of each visible child plus the end gap at the raw child
/// count. Nodes the traversal filter does not accept are hidden wholesale —
/// they contribute neither positions nor gaps.
///
/// Two adjacent visible text nodes are walked as one run: the first node's
/// end offset and the gap between them are not canonical, the boundary is
/// represented by the second node's offset zero alone. A marker splitting
/// a text node therefore leaves the walk unchanged — the positions of
/// `"AB"` and of `"A" | marker | "B"` correspond one to one. A text node
/// with no following text sibling does keep its end offset `len` as a
/// position.
///
/// The tree is externally owned and mutated between calls, so every
/// operation takes it explicitly. One instance holds exactly one position;
/// it is restartable via [`set_position`](Self::set_position) but not
/// reentrant. Trees are assumed normalized: no empty text nodes, and no
/// adjacent text siblings other than those a marker split produces.
#[derive(Debug, Clone)]
pub struct PositionIterator<F> {
    root: NodeId,
    container: NodeId,
    offset: usize,
    filter: F,
}

impl<F> PositionIterator<F> {
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.container, self.offset)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Restore a previously read canonical position without renormalizing.
    pub(crate) fn restore(&mut self, position: Position) {
        self.container = position.container;
        self.offset = position.offset;
    }
}

impl<F: TraversalFilter> PositionIterator<F> {
    /// Iterator over the subtree under `root`, positioned at the first
    /// canonical position.
    pub fn new(tree: &DocumentTree, root: NodeId, filter: F) -> Self {
        let mut iterator = Self {
            root,
            container: root,
            offset: 0,
            filter,
        };
        iterator.set_position(tree, root, 0);
        iterator
    }

    /// Absolute repositioning onto the canonical position at-or-after the
    /// given pair.
    ///
    /// Text offsets are clamped, offsets naming hidden children slide to
    /// the next visible gap, coalesced boundaries land on the following
    /// text node, and pairs inside a hidden subtree climb out to the gap
    /// following it. The effect is undefined for containers outside the
    /// iterator's root.
    pub fn set_position(&mut self, tree: &DocumentTree, container: NodeId, offset: usize) {
        let (container, offset) = match self.topmost_hidden_ancestor(tree, container) {
            Some(hidden) => {
                let parent = tree
                    .parent(hidden)
                    .expect("hidden subtree hangs under a visible parent");
                (parent, tree.sibling_index(hidden))
            }
            None => (container, offset),
        };
        match tree.kind(container) {
            NodeKind::Text => {
                let offset = offset.min(tree.text_len(container));
                if offset == tree.text_len(container)
                    && container != self.root
                    && let Some(next) = self.next_visible_text_sibling(tree, container)
                {
                    // coalesced boundary: represented by the next run
                    self.container = next;
                    self.offset = 0;
                } else {
                    self.container = container;
                    self.offset = offset;
                }
            }
            NodeKind::Element => {
                let position = self.canonical_at_or_after(tree, container, offset);
                self.container = position.container;
                self.offset = position.offset;
            }
        }
    }

    /// Advance to the next canonical position. Returns `false` at the end
    /// of the traversable range — a terminal condition, not an error.
    pub fn next_position(&mut self, tree: &DocumentTree) -> bool {
        match tree.kind(self.container) {
            NodeKind::Text => {
                let len = tree.text_len(self.container);
                if self.offset < len {
                    if self.offset + 1 == len
                        && self.container != self.root
                        && let Some(next) = self.next_visible_text_sibling(tree, self.container)
                    {
                        self.container = next;
                        self.offset = 0;
                    } else {
                        self.offset += 1;
                    }
                    true
                } else {
                    self.exit_forward(tree, self.container)
                }
            }
            NodeKind::Element => {
                match self.visible_child_at_or_after(tree, self.container, self.offset) {
                    Some((child, index)) if index == self.offset => {
                        self.enter_front(tree, child);
                        true
                    }
                    Some((_, index)) => {
                        // non-canonical state: move to the canonical gap
                        let position = self.canonical_at_or_after(tree, self.container, index);
                        self.container = position.container;
                        self.offset = position.offset;
                        true
                    }
                    None => {
                        let end = tree.child_count(self.container);
                        if self.offset < end {
                            self.offset = end;
                            true
                        } else {
                            self.exit_forward(tree, self.container)
                        }
                    }
                }
            }
        }
    }

    /// Retreat to the previous canonical position. Returns `false` at the
    /// start of the traversable range.
    pub fn previous_position(&mut self, tree: &DocumentTree) -> bool {
        match tree.kind(self.container) {
            NodeKind::Text => {
                if self.offset > 0 {
                    self.offset -= 1;
                    true
                } else if self.container != self.root
                    && let Some(prev) = self.prev_visible_text_sibling(tree, self.container)
                {
                    // coalesced boundary: step back into the previous run
                    self.container = prev;
                    self.offset = tree.text_len(prev).saturating_sub(1);
                    true
                } else {
                    self.exit_backward(tree, self.container)
                }
            }
            NodeKind::Element => {
                match self.visible_child_before(tree, self.container, self.offset) {
                    Some(child) => {
                        self.enter_back(tree, child);
                        true
                    }
                    None => self.exit_backward(tree, self.container),
                }
            }
        }
    }

    fn is_visible(&self, tree: &DocumentTree, node: NodeId) -> bool {
        self.filter.classify_node(tree, node) == FilterVerdict::Accept
    }

    /// Closest-to-root node on the container's ancestor chain (inclusive,
    /// bounded by `root`) that the filter hides.
    fn topmost_hidden_ancestor(&self, tree: &DocumentTree, container: NodeId) -> Option<NodeId> {
        let mut hidden = None;
        let mut node = container;
        while node != self.root {
            if !self.is_visible(tree, node) {
                hidden = Some(node);
            }
            match tree.parent(node) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        hidden
    }

    /// Next visible sibling, provided it is a text node.
    fn next_visible_text_sibling(&self, tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
        let mut sibling = tree.next_sibling(node);
        while let Some(s) = sibling {
            if self.is_visible(tree, s) {
                return (tree.kind(s) == NodeKind::Text).then_some(s);
            }
            sibling = tree.next_sibling(s);
        }
        None
    }

    /// Previous visible sibling, provided it is a text node.
    fn prev_visible_text_sibling(&self, tree: &DocumentTree, node: NodeId) -> Option<NodeId> {
        let mut sibling = tree.prev_sibling(node);
        while let Some(s) = sibling {
            if self.is_visible(tree, s) {
                return (tree.kind(s) == NodeKind::Text).then_some(s);
            }
            sibling = tree.prev_sibling(s);
        }
        None
    }

    fn visible_child_at_or_after(
        &self,
        tree: &DocumentTree,
        parent: NodeId,
        offset: usize,
    ) -> Option<(NodeId, usize)> {
        tree.children(parent)
            .enumerate()
            .find(|&(index, child)| index >= offset && self.is_visible(tree, child))
            .map(|(index, child)| (child, index))
    }

    fn visible_child_before(
        &self,
        tree: &DocumentTree,
        parent: NodeId,
        offset: usize,
    ) -> Option<NodeId> {
        let mut found = None;
        for (index, child) in tree.children(parent).enumerate() {
            if index >= offset {
                break;
            }
            if self.is_visible(tree, child) {
                found = Some(child);
            }
        }
        found
    }

    /// Canonical position at-or-after the gap `(parent, offset)`.
    ///
    /// The gap before a visible child is canonical unless the child is a
    /// text node continuing a text run; that boundary belongs to the text
    /// node itself.
    fn canonical_at_or_after(
        &self,
        tree: &DocumentTree,
        parent: NodeId,
        offset: usize,
    ) -> Position {
        match self.visible_child_at_or_after(tree, parent, offset) {
            Some((child, index)) => {
                if tree.kind(child) == NodeKind::Text
                    && self.prev_visible_text_sibling(tree, child).is_some()
                {
                    Position::new(child, 0)
                } else {
                    Position::new(parent, index)
                }
            }
            None => Position::new(parent, tree.child_count(parent)),
        }
    }

    /// First canonical position inside `node`.
    fn enter_front(&mut self, tree: &DocumentTree, node: NodeId) {
        match tree.kind(node) {
            NodeKind::Text => {
                self.container = node;
                self.offset = 0;
            }
            NodeKind::Element => {
                let position = self.canonical_at_or_after(tree, node, 0);
                self.container = position.container;
                self.offset = position.offset;
            }
        }
    }

    /// Last canonical position inside `node`.
    fn enter_back(&mut self, tree: &DocumentTree, node: NodeId) {
        self.container = node;
        self.offset = match tree.kind(node) {
            NodeKind::Text => tree.text_len(node),
            NodeKind::Element => tree.child_count(node),
        };
    }

    /// Move to the gap following `from` in its parent.
    fn exit_forward(&mut self, tree: &DocumentTree, from: NodeId) -> bool {
        if from == self.root {
            return false;
        }
        let parent = tree.parent(from).expect("traversal stays under the root");
        let mut sibling = tree.next_sibling(from);
        while let Some(s) = sibling {
            if self.is_visible(tree, s) {
                self.container = parent;
                self.offset = tree.sibling_index(s);
                return true;
            }
            sibling = tree.next_sibling(s);
        }
        self.container = parent;
        self.offset = tree.child_count(parent);
        true
    }

    /// Move to the gap before `from` in its parent.
    fn exit_backward(&mut self, tree: &DocumentTree, from: NodeId) -> bool {
        if from == self.root {
            return false;
        }
        let parent = tree.parent(from).expect("traversal stays under the root");
        self.container = parent;
        self.offset = tree.sibling_index(from);
        true
    }
}
