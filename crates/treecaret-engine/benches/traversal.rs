use criterion::{Criterion, criterion_group, criterion_main};
use treecaret_engine::{
    AcceptAll, CharacterSteps, Cursor, DocumentTree, Namespace, NodeId, SelectionMover,
};

fn build_document(paragraphs: usize) -> (DocumentTree, NodeId) {
    let mut tree = DocumentTree::new();
    let root = tree.new_element("root", Namespace::Document);
    for i in 0..paragraphs {
        let p = tree.new_element("p", Namespace::Document);
        let t = tree.new_text(format!("paragraph {i} with some text to walk"));
        tree.append_child(root, p).unwrap();
        tree.append_child(p, t).unwrap();
    }
    (tree, root)
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    let (tree, root) = build_document(100);
    group.bench_function("full_walk", |b| {
        b.iter(|| {
            let mut it = SelectionMover::create_position_iterator(&tree, root);
            let mut positions = 0usize;
            while it.next_position(std::hint::black_box(&tree)) {
                positions += 1;
            }
            std::hint::black_box(positions)
        });
    });

    let (mut counted_tree, counted_root) = build_document(100);
    let cursor = Cursor::new(&mut counted_tree);
    let mut counting_mover = SelectionMover::new(cursor, &mut counted_tree, counted_root);
    group.bench_function("count_forward_steps", |b| {
        b.iter(|| {
            let mut counter = counting_mover.step_counter();
            std::hint::black_box(counter.count_forward_steps(
                &counted_tree,
                500,
                &CharacterSteps,
            ))
        });
    });
    group.bench_function("count_forward_steps_accept_all", |b| {
        b.iter(|| {
            let mut counter = counting_mover.step_counter();
            std::hint::black_box(counter.count_forward_steps(&counted_tree, 500, &AcceptAll))
        });
    });

    let (mut moved_tree, moved_root) = build_document(20);
    let cursor = Cursor::new(&mut moved_tree);
    let mut moving_mover = SelectionMover::new(cursor, &mut moved_tree, moved_root);
    group.bench_function("move_point_round_trip", |b| {
        b.iter(|| {
            let forward = moving_mover.move_point_forward(&mut moved_tree, 64);
            let back = moving_mover.move_point_backward(&mut moved_tree, forward);
            std::hint::black_box((forward, back))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_traversal);
criterion_main!(benches);
