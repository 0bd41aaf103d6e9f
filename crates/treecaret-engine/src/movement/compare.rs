use std::cmp::Ordering;

use crate::dom::{DocumentTree, NodeId, NodeRelation, Position};

/// Compare two points for document order.
///
/// Returns zero when the points are equal, a **positive** value when point
/// 1 precedes point 2 and a negative value otherwise. Only the sign is
/// meaningful, except in the same-container case where the value is
/// exactly `o2 - o1`. The inverted sign convention is load-bearing for
/// callers that treat "how far ahead is the target" as a direction.
#[must_use]
pub fn compare_points(
    tree: &DocumentTree,
    c1: NodeId,
    o1: usize,
    c2: NodeId,
    o2: usize,
) -> isize {
    let (o1, o2) = (as_signed(o1), as_signed(o2));
    match tree.relation(c1, c2) {
        NodeRelation::Same => o2 - o1,
        NodeRelation::Before => 1,
        NodeRelation::After => -1,
        NodeRelation::Contains => {
            // point 2 sits inside a child subtree of container 1; order is
            // decided by that subtree's index against offset 1
            let index = as_signed(position_in_containing_node(tree, c2, c1));
            if index < o1 { -1 } else { 1 }
        }
        NodeRelation::ContainedBy => {
            let index = as_signed(position_in_containing_node(tree, c1, c2));
            if index < o2 { 1 } else { -1 }
        }
    }
}

/// [`compare_points`] as a standard [`Ordering`] over [`Position`]s.
#[must_use]
pub fn document_order(tree: &DocumentTree, a: Position, b: Position) -> Ordering {
    // positive means `a` precedes `b`
    match compare_points(tree, a.container, a.offset, b.container, b.offset) {
        0 => Ordering::Equal,
        n if n > 0 => Ordering::Less,
        _ => Ordering::Greater,
    }
}

/// Index among `container`'s direct children of the child whose subtree
/// holds `node`.
fn position_in_containing_node(tree: &DocumentTree, node: NodeId, container: NodeId) -> usize {
    let mut branch = node;
    while tree.parent(branch) != Some(container) {
        branch = tree
            .parent(branch)
            .expect("node must be a descendant of the container");
    }
    tree.sibling_index(branch)
}

fn as_signed(v: usize) -> isize {
    isize::try_from(v).expect("offset fits in isize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Namespace;
    use rstest::rstest;

    struct Fixture {
        tree: DocumentTree,
        root: NodeId,
        p1: NodeId,
        t1: NodeId,
        b: NodeId,
        t2: NodeId,
        p2: NodeId,
        t3: NodeId,
    }

    /// `<root><p1>ab<b>cd</b></p1><p2>ef</p2></root>`
    fn fixture() -> Fixture {
        let mut tree = DocumentTree::new();
        let root = tree.new_element("root", Namespace::Document);
        let p1 = tree.new_element("p", Namespace::Document);
        let t1 = tree.new_text("ab");
        let b = tree.new_element("b", Namespace::Document);
        let t2 = tree.new_text("cd");
        let p2 = tree.new_element("p", Namespace::Document);
        let t3 = tree.new_text("ef");
        tree.append_child(root, p1).unwrap();
        tree.append_child(p1, t1).unwrap();
        tree.append_child(p1, b).unwrap();
        tree.append_child(b, t2).unwrap();
        tree.append_child(root, p2).unwrap();
        tree.append_child(p2, t3).unwrap();
        Fixture {
            tree,
            root,
            p1,
            t1,
            b,
            t2,
            p2,
            t3,
        }
    }

    #[test]
    fn same_container_compares_offsets() {
        let f = fixture();
        assert_eq!(compare_points(&f.tree, f.t1, 0, f.t1, 2), 2);
        assert_eq!(compare_points(&f.tree, f.t1, 2, f.t1, 0), -2);
        assert_eq!(compare_points(&f.tree, f.t1, 1, f.t1, 1), 0);
    }

    #[test]
    fn sibling_containers_compare_by_order() {
        let f = fixture();
        assert_eq!(compare_points(&f.tree, f.t1, 2, f.t3, 0), 1);
        assert_eq!(compare_points(&f.tree, f.t3, 0, f.t1, 2), -1);
    }

    #[test]
    fn ancestor_container_compares_child_index_against_offset() {
        let f = fixture();
        // (p1, 0) is before anything inside b (child index 1)
        assert_eq!(compare_points(&f.tree, f.p1, 0, f.t2, 1), 1);
        // (p1, 2) is after the whole b subtree
        assert_eq!(compare_points(&f.tree, f.p1, 2, f.t2, 1), -1);
        // mirrored arguments flip the sign
        assert_eq!(compare_points(&f.tree, f.t2, 1, f.p1, 0), -1);
        assert_eq!(compare_points(&f.tree, f.t2, 1, f.p1, 2), 1);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, 1)]
    #[case(1, 0)]
    #[case(2, 2)]
    fn antisymmetry_holds(#[case] o1: usize, #[case] o2: usize) {
        let f = fixture();
        let pairs = [
            (f.t1, o1, f.t2, o2),
            (f.p1, o1, f.t3, o2),
            (f.root, o1, f.t2, o2),
            (f.b, o1, f.p2, o2),
        ];
        for (c1, o1, c2, o2) in pairs {
            let forward = compare_points(&f.tree, c1, o1, c2, o2);
            let backward = compare_points(&f.tree, c2, o2, c1, o1);
            assert_eq!(forward.signum(), -backward.signum());
        }
    }

    #[test]
    fn document_order_matches_sign() {
        let f = fixture();
        let early = Position::new(f.t1, 0);
        let late = Position::new(f.t3, 1);
        assert_eq!(document_order(&f.tree, early, late), Ordering::Less);
        assert_eq!(document_order(&f.tree, late, early), Ordering::Greater);
        assert_eq!(document_order(&f.tree, early, early), Ordering::Equal);
    }
}
