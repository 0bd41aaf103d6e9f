use crate::dom::node::{Namespace, NodeId, NodeKind, NodeRelation};

/// Error raised by structural mutation of a [`DocumentTree`].
///
/// Boundary conditions during traversal are never errors; these cover
/// caller-facing misuse of the mutation API only.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
    #[error("offset {offset} is out of range for {node:?} (length {len})")]
    OffsetOutOfRange {
        node: NodeId,
        offset: usize,
        len: usize,
    },
    #[error("{0:?} and {1:?} are not adjacent siblings")]
    NotAdjacent(NodeId, NodeId),
}

#[derive(Debug, Clone)]
enum Payload {
    Element { name: String, namespace: Namespace },
    Text { content: String },
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    payload: Payload,
}

/// Mutable document tree backed by a node arena.
///
/// All navigation is id-based; indexing with an id from another tree is a
/// programming error and panics. Offsets into text nodes are character
/// counts, not byte counts.
#[derive(Debug, Clone, Default)]
pub struct DocumentTree {
    nodes: Vec<NodeData>,
}

impl DocumentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element node.
    pub fn new_element(&mut self, name: impl Into<String>, namespace: Namespace) -> NodeId {
        self.push(Payload::Element {
            name: name.into(),
            namespace,
        })
    }

    /// Create a detached text node.
    pub fn new_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(Payload::Text {
            content: content.into(),
        })
    }

    fn push(&mut self, payload: Payload) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("node arena overflow"));
        self.nodes.push(NodeData {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            payload,
        });
        id
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.node(id).payload {
            Payload::Element { .. } => NodeKind::Element,
            Payload::Text { .. } => NodeKind::Text,
        }
    }

    /// Element name, `None` for text nodes.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).payload {
            Payload::Element { name, .. } => Some(name),
            Payload::Text { .. } => None,
        }
    }

    /// Element namespace, `None` for text nodes.
    #[must_use]
    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        match self.node(id).payload {
            Payload::Element { namespace, .. } => Some(namespace),
            Payload::Text { .. } => None,
        }
    }

    /// Text content, `None` for elements.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).payload {
            Payload::Element { .. } => None,
            Payload::Text { content } => Some(content),
        }
    }

    /// Character length of a text node; zero for elements.
    #[must_use]
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |s| s.chars().count())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).parent.is_some()
    }

    /// Iterate the children of `parent` in order.
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.first_child(parent);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.next_sibling(current);
            Some(current)
        })
    }

    #[must_use]
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).count()
    }

    /// Child of `parent` at raw index `index`, if any.
    #[must_use]
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Raw index of `id` among its siblings.
    ///
    /// # Panics
    ///
    /// Panics if `id` is detached.
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> usize {
        assert!(self.is_attached(id), "sibling_index of a detached node");
        let mut index = 0;
        let mut prev = self.prev_sibling(id);
        while let Some(p) = prev {
            index += 1;
            prev = self.prev_sibling(p);
        }
        index
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_attachable(parent, child)?;
        let old_last = self.node(parent).last_child;
        {
            let c = self.node_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = old_last;
            c.next_sibling = None;
        }
        match old_last {
            Some(last) => self.node_mut(last).next_sibling = Some(child),
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
        Ok(())
    }

    /// Insert `node` as the previous sibling of `sibling`.
    pub fn insert_before(&mut self, node: NodeId, sibling: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(sibling).ok_or(TreeError::Detached(sibling))?;
        self.check_attachable(parent, node)?;
        let before = self.node(sibling).prev_sibling;
        {
            let n = self.node_mut(node);
            n.parent = Some(parent);
            n.prev_sibling = before;
            n.next_sibling = Some(sibling);
        }
        self.node_mut(sibling).prev_sibling = Some(node);
        match before {
            Some(b) => self.node_mut(b).next_sibling = Some(node),
            None => self.node_mut(parent).first_child = Some(node),
        }
        Ok(())
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.kind(parent) != NodeKind::Element {
            return Err(TreeError::NotAnElement(parent));
        }
        if self.is_attached(child) {
            return Err(TreeError::AlreadyAttached(child));
        }
        // walking up from the parent must not reach the child
        let mut cursor = Some(parent);
        while let Some(n) = cursor {
            if n == child {
                return Err(TreeError::WouldCycle { parent, child });
            }
            cursor = self.parent(n);
        }
        Ok(())
    }

    /// Detach `node` from its parent. No-op if already detached. The node
    /// keeps its id and its own children.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        let (prev, next) = {
            let n = self.node(node);
            (n.prev_sibling, n.next_sibling)
        };
        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let n = self.node_mut(node);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }

    /// Split an attached text node at character offset `at`, carving the
    /// head off into a new text node inserted immediately before it.
    /// Returns the head node; `node` keeps the tail.
    pub fn split_text(&mut self, node: NodeId, at: usize) -> Result<NodeId, TreeError> {
        let content = self.text(node).ok_or(TreeError::NotText(node))?;
        let len = content.chars().count();
        if at == 0 || at >= len {
            return Err(TreeError::OffsetOutOfRange {
                node,
                offset: at,
                len,
            });
        }
        if !self.is_attached(node) {
            return Err(TreeError::Detached(node));
        }
        let byte_at = char_to_byte(content, at);
        let head_content = content[..byte_at].to_owned();
        let tail_content = content[byte_at..].to_owned();
        let head = self.new_text(head_content);
        self.insert_before(head, node)?;
        match &mut self.node_mut(node).payload {
            Payload::Text { content } => *content = tail_content,
            Payload::Element { .. } => unreachable!("kind checked above"),
        }
        Ok(head)
    }

    /// Merge the text of `node` into the front of its next sibling `into`,
    /// detaching `node`. Returns the character growth of `into`.
    pub fn merge_text(&mut self, node: NodeId, into: NodeId) -> Result<usize, TreeError> {
        if self.next_sibling(node) != Some(into) {
            return Err(TreeError::NotAdjacent(node, into));
        }
        let head = self.text(node).ok_or(TreeError::NotText(node))?.to_owned();
        if self.text(into).is_none() {
            return Err(TreeError::NotText(into));
        }
        let growth = head.chars().count();
        match &mut self.node_mut(into).payload {
            Payload::Text { content } => content.insert_str(0, &head),
            Payload::Element { .. } => unreachable!("kind checked above"),
        }
        self.detach(node);
        Ok(growth)
    }

    /// Structural relationship of `a` to `b`.
    ///
    /// Both nodes must belong to one attached subtree; two nodes with no
    /// common ancestor are a programming error.
    #[must_use]
    pub fn relation(&self, a: NodeId, b: NodeId) -> NodeRelation {
        if a == b {
            return NodeRelation::Same;
        }
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        debug_assert_eq!(path_a[0], path_b[0], "nodes are in disjoint trees");
        let mut common = 0;
        while common < path_a.len() && common < path_b.len() && path_a[common] == path_b[common] {
            common += 1;
        }
        if common == path_a.len() {
            return NodeRelation::Contains;
        }
        if common == path_b.len() {
            return NodeRelation::ContainedBy;
        }
        // siblings under the lowest common ancestor decide the order
        let branch_a = path_a[common];
        let branch_b = path_b[common];
        let mut sib = self.next_sibling(branch_a);
        while let Some(s) = sib {
            if s == branch_b {
                return NodeRelation::Before;
            }
            sib = self.next_sibling(s);
        }
        NodeRelation::After
    }

    fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            path.push(p);
            cursor = self.parent(p);
        }
        path.reverse();
        path
    }
}

fn char_to_byte(s: &str, at: usize) -> usize {
    s.char_indices()
        .nth(at)
        .map_or(s.len(), |(byte, _)| byte)
}
