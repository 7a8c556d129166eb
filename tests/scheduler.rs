use std::cell::RefCell;
use std::rc::Rc;

use canopy::error::SchedulerError;
use canopy::prelude::*;

fn loaded() -> (Tree, ManualClock, NodeId) {
    let clock = ManualClock::new();
    let mut tree = Tree::new(clock.clone());
    let root = tree.insert(container());
    tree.set_root(root).unwrap();
    tree.update();
    (tree, clock, root)
}

#[test]
fn test_delayed_tasks_run_in_due_order() {
    let (mut tree, clock, root) = loaded();
    let log = Rc::new(RefCell::new(Vec::new()));
    for delay in [20.0, 5.0, 10.0] {
        let log = Rc::clone(&log);
        tree.node_mut(root)
            .unwrap()
            .schedule_delayed(delay, move |_tree: &mut Tree| log.borrow_mut().push(delay))
            .unwrap();
    }

    clock.set_time(7.0);
    tree.update();
    assert_eq!(*log.borrow(), vec![5.0]);

    clock.set_time(25.0);
    tree.update();
    assert_eq!(*log.borrow(), vec![5.0, 10.0, 20.0]);
    assert_eq!(tree.node(root).unwrap().scheduled_tasks(), 0);
}

#[test]
fn test_repeating_does_not_drift() {
    let (mut tree, clock, root) = loaded();
    let runs = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&runs);
    tree.node_mut(root)
        .unwrap()
        .schedule_repeating(100.0, move |tree: &mut Tree| {
            let time = tree.node(root).and_then(|node| node.time()).unwrap_or(-1.0);
            sink.borrow_mut().push(time);
        })
        .unwrap();

    for time in [130.0, 210.0, 290.0, 300.0] {
        clock.set_time(time);
        tree.update();
    }
    // Due at 100, 200, 300: late frames do not push the schedule back.
    assert_eq!(*runs.borrow(), vec![130.0, 210.0, 300.0]);
}

#[test]
fn test_task_can_cancel_a_later_one_in_the_same_frame() {
    let (mut tree, clock, root) = loaded();
    let ran = Rc::new(RefCell::new(false));

    let flag = Rc::clone(&ran);
    let victim = tree
        .node_mut(root)
        .unwrap()
        .schedule_delayed(10.0, move |_tree: &mut Tree| *flag.borrow_mut() = true)
        .unwrap();
    tree.node_mut(root)
        .unwrap()
        .schedule_delayed(5.0, move |tree: &mut Tree| {
            if let Some(mut node) = tree.node_mut(root) {
                node.cancel_task(victim);
            }
        })
        .unwrap();

    clock.set_time(50.0);
    tree.update();
    assert!(!*ran.borrow());
    assert_eq!(tree.stats().tasks_run, 1);
}

#[test]
fn test_cancel_unknown_is_harmless() {
    let (mut tree, _clock, root) = loaded();
    let id = tree
        .node_mut(root)
        .unwrap()
        .schedule(|_tree: &mut Tree| {})
        .unwrap();
    let mut node = tree.node_mut(root).unwrap();
    assert!(node.cancel_task(id));
    assert!(!node.cancel_task(id));
}

#[test]
fn test_unloaded_node_has_no_clock() {
    let mut tree = Tree::new(ManualClock::new());
    let orphan = tree.insert(drawable());
    let err = tree
        .node_mut(orphan)
        .unwrap()
        .schedule_delayed(10.0, |_tree: &mut Tree| {})
        .unwrap_err();
    assert_eq!(err, Error::Scheduler(SchedulerError::NoClock));
}

#[test]
fn test_non_positive_interval_is_rejected() {
    let (mut tree, _clock, root) = loaded();
    let err = tree
        .node_mut(root)
        .unwrap()
        .schedule_repeating(0.0, |_tree: &mut Tree| {})
        .unwrap_err();
    assert_eq!(err, Error::Scheduler(SchedulerError::InvalidInterval(0.0)));
}

#[test]
fn test_task_may_restructure_the_tree() {
    let (mut tree, clock, root) = loaded();
    let child = tree.insert(drawable());
    tree.node_mut(root)
        .unwrap()
        .schedule_delayed(10.0, move |tree: &mut Tree| {
            tree.add_child(root, child).unwrap();
        })
        .unwrap();

    clock.set_time(10.0);
    tree.update();
    let child = tree.node(child).unwrap();
    assert!(child.is_loaded());
    assert_eq!(child.parent(), Some(root));
}
