use canopy::prelude::*;

fn three_children() -> (Tree, NodeId, [NodeId; 3]) {
    let mut tree = Tree::new(ManualClock::new());
    let root = tree.insert(container().size((300.0, 300.0)));
    tree.set_root(root).unwrap();
    let mut children = [root; 3];
    for (i, depth) in [3.0, 1.0, 2.0].into_iter().enumerate() {
        let child = tree.insert(drawable().size((10.0, 10.0)).depth(depth));
        tree.add_child(root, child).unwrap();
        children[i] = child;
    }
    tree.update();
    (tree, root, children)
}

#[test]
fn test_invalidate_is_idempotent() {
    let (mut tree, root, [a, ..]) = three_children();
    assert!(tree.invalidate(a, Invalidation::DRAW_INFO, true));
    assert!(!tree.invalidate(a, Invalidation::DRAW_INFO, true));
    assert!(tree.node(root).unwrap().invalidation().contains(Invalidation::DRAW_INFO));

    // Already contained in ALL.
    assert!(tree.invalidate(a, Invalidation::ALL, true));
    assert!(!tree.invalidate(a, Invalidation::COLOUR, true));
}

#[test]
fn test_colour_does_not_reach_the_parent() {
    let (mut tree, root, [a, ..]) = three_children();
    tree.node_mut(a).unwrap().set_alpha(0.5);
    assert_eq!(tree.node(a).unwrap().invalidation(), Invalidation::COLOUR);
    assert!(tree.node(root).unwrap().invalidation().is_empty());
}

#[test]
fn test_many_changes_one_recompute() {
    let (mut tree, _root, [a, ..]) = three_children();
    {
        let mut node = tree.node_mut(a).unwrap();
        node.set_size((20.0, 20.0));
        node.set_position((5.0, 5.0));
        node.set_rotation(45.0);
        node.set_size((30.0, 30.0));
    }
    let stats = *tree.update();
    // The root was dirtied by propagation and pushes its flags to all three
    // children: four recomputes in total, each node once.
    assert_eq!(stats.draw_info_computed, 4);
    assert_eq!(stats.nodes_updated, 4);

    let stats = *tree.update();
    assert_eq!(stats.draw_info_computed, 0);
    assert_eq!(tree.node(a).unwrap().draw_size(), Vector2::new(30.0, 30.0));
}

#[test]
fn test_untouched_subtree_is_skipped() {
    let mut tree = Tree::new(ManualClock::new());
    let root = tree.insert(container().size((300.0, 300.0)));
    let left = tree.insert(container().size((100.0, 100.0)));
    let right = tree.insert(container().size((100.0, 100.0)));
    let leaf = tree.insert(drawable());
    tree.set_root(root).unwrap();
    tree.add_child(root, left).unwrap();
    tree.add_child(root, right).unwrap();
    tree.add_child(right, leaf).unwrap();
    tree.update();

    tree.node_mut(left).unwrap().set_color(Color::BLACK);
    let stats = *tree.update();
    assert_eq!(stats.draw_info_computed, 1);
    assert_eq!(stats.draw_info_skipped, 3);
    assert_eq!(tree.stats().skip_rate(), 75.0);
}

#[test]
fn test_depth_change_invalidates_only_the_parent() {
    let (mut tree, root, [a, b, c]) = three_children();
    assert_eq!(tree.draw_order(root), vec![a, c, b]);

    tree.node_mut(b).unwrap().set_depth(10.0);
    assert!(tree.node(root).unwrap().invalidation().contains(Invalidation::DRAW_INFO));
    for id in [a, b, c] {
        assert!(tree.node(id).unwrap().invalidation().is_empty());
    }
    assert_eq!(tree.draw_order(root), vec![b, a, c]);
}

#[test]
fn test_ties_keep_insertion_order() {
    let mut tree = Tree::new(ManualClock::new());
    let root = tree.insert(container());
    tree.set_root(root).unwrap();
    let ids: Vec<NodeId> = (0..4)
        .map(|_| {
            let id = tree.insert(drawable());
            tree.add_child(root, id).unwrap();
            id
        })
        .collect();
    tree.update();
    assert_eq!(tree.draw_order(root), ids);
}

#[test]
fn test_sub_epsilon_change_is_dropped() {
    let (mut tree, _root, [a, ..]) = three_children();
    tree.node_mut(a).unwrap().set_position((0.00001, 0.0));
    let node = tree.node(a).unwrap();
    assert!(node.invalidation().is_empty());
    assert_eq!(node.position(), Vector2::ZERO);
}

#[test]
fn test_small_steps_accumulate_until_they_invalidate() {
    let (mut tree, _root, [a, ..]) = three_children();
    for x in [0.00004, 0.00008, 0.00012] {
        tree.node_mut(a).unwrap().set_position((x, 0.0));
    }
    let node = tree.node(a).unwrap();
    assert!(node.invalidation().contains(Invalidation::DRAW_INFO));
    assert_eq!(node.position(), Vector2::new(0.00012, 0.0));
}
