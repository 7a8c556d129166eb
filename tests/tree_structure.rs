use canopy::error::TreeError;
use canopy::prelude::*;

fn tree_with_root() -> (Tree, NodeId) {
    let mut tree = Tree::new(ManualClock::new());
    let root = tree.insert(container().size((100.0, 100.0)).label("root"));
    tree.set_root(root).unwrap();
    (tree, root)
}

#[test]
fn test_cycle_is_rejected_and_tree_unchanged() {
    let (mut tree, root) = tree_with_root();
    let a = tree.insert(container());
    let b = tree.insert(container());
    tree.add_child(root, a).unwrap();
    tree.add_child(a, b).unwrap();

    let err = tree.add_child(b, a).unwrap_err();
    assert_eq!(err, Error::Tree(TreeError::Cycle { parent: b, child: a }));
    assert_eq!(tree.parent(a), Some(root));
    assert_eq!(tree.parent(b), Some(a));
    assert_eq!(tree.children(b), &[] as &[NodeId]);
}

#[test]
fn test_self_parent_is_rejected() {
    let (mut tree, _root) = tree_with_root();
    let a = tree.insert(container());
    assert_eq!(
        tree.add_child(a, a),
        Err(Error::Tree(TreeError::SelfParent(a)))
    );
}

#[test]
fn test_leaf_cannot_hold_children() {
    let (mut tree, root) = tree_with_root();
    let leaf = tree.insert(drawable());
    let other = tree.insert(drawable());
    tree.add_child(root, leaf).unwrap();
    assert_eq!(
        tree.add_child(leaf, other),
        Err(Error::Tree(TreeError::NotAContainer(leaf)))
    );
}

#[test]
fn test_root_cannot_be_reparented() {
    let (mut tree, root) = tree_with_root();
    let a = tree.insert(container());
    tree.add_child(root, a).unwrap();
    assert_eq!(tree.add_child(a, root), Err(Error::Tree(TreeError::IsRoot(root))));
}

#[test]
fn test_reparenting_moves_the_child() {
    let (mut tree, root) = tree_with_root();
    let a = tree.insert(container());
    let b = tree.insert(container());
    let c = tree.insert(drawable());
    tree.add_child(root, a).unwrap();
    tree.add_child(root, b).unwrap();
    tree.add_child(a, c).unwrap();

    tree.add_child(b, c).unwrap();
    assert_eq!(tree.parent(c), Some(b));
    assert!(tree.children(a).is_empty());
    assert_eq!(tree.children(b), &[c]);

    // Adding to the current parent again is a no-op.
    tree.add_child(b, c).unwrap();
    assert_eq!(tree.children(b), &[c]);
}

#[test]
fn test_remove_keeps_the_node() {
    let (mut tree, root) = tree_with_root();
    let a = tree.insert(drawable());
    tree.add_child(root, a).unwrap();
    tree.update();

    assert_eq!(tree.remove_child(root, a), Ok(true));
    assert_eq!(tree.remove_child(root, a), Ok(false));
    assert!(tree.contains(a));
    assert!(!tree.is_attached(a));
    assert!(tree.node(root).unwrap().invalidation().contains(Invalidation::DRAW_INFO));
}

#[test]
fn test_ancestors_terminate() {
    let (mut tree, root) = tree_with_root();
    let mut parent = root;
    for _ in 0..50 {
        let next = tree.insert(container());
        tree.add_child(parent, next).unwrap();
        parent = next;
    }
    let chain: Vec<NodeId> = tree.ancestors(parent).take(tree.len() + 1).collect();
    assert_eq!(chain.len(), 50);
    assert_eq!(chain.last(), Some(&root));
}

#[test]
fn test_dispose_frees_subtree_and_stales_handles() {
    let (mut tree, root) = tree_with_root();
    let a = tree.insert(container());
    let b = tree.insert(drawable());
    tree.add_child(root, a).unwrap();
    tree.add_child(a, b).unwrap();
    assert_eq!(tree.len(), 3);

    tree.dispose(a).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree.node(a).is_none());
    assert!(tree.node(b).is_none());
    assert_eq!(
        tree.add_child(root, b),
        Err(Error::Tree(TreeError::StaleNode(b)))
    );

    // A recycled slot gets a new generation.
    let fresh = tree.insert(drawable());
    assert!(tree.contains(fresh));
    assert!(!tree.contains(a));
    assert!(!tree.contains(b));
}

#[test]
fn test_children_load_with_their_parent() {
    let mut tree = Tree::new(ManualClock::at(250.0));
    let root = tree.insert(container());
    let child = tree.insert(drawable());
    tree.add_child(root, child).unwrap();
    assert!(!tree.node(child).unwrap().is_loaded());

    tree.set_root(root).unwrap();
    let child_ref = tree.node(child).unwrap();
    assert!(child_ref.is_loaded());
    assert_eq!(child_ref.time(), Some(250.0));
}
