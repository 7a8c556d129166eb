//! Input events and their dispatch through the tree.
//!
//! Events arrive already normalized to screen pixels. Routing depends on the
//! kind of event:
//!
//! - `MouseDown` and `Scroll` are positional: children are probed topmost
//!   first (input order, the reverse of draw order), and a node's own
//!   behavior is asked only after none of its children handled the event and
//!   only if the point lies inside its draw rectangle. A handled `MouseDown`
//!   makes the handler the drag target.
//! - While a drag is active, `MouseMove` and `MouseUp` go straight to the drag
//!   target. `MouseUp` ends the drag.
//! - Without a drag, `MouseMove` is broadcast to every visible node, and
//!   nodes whose hover state flips receive `HoverGained` or `HoverLost`.
//! - Keyboard events are not gated by position. A node's behavior sees the
//!   event before its children and handling it keeps them from seeing it.
//!   Otherwise every child gets the event, whatever its siblings answered.
//!
//! Nodes with a draw alpha of zero receive no positional input, and a masking
//! node hides its children from points outside its own rectangle.

use log::{debug, trace};

use crate::geometry::Vector2;
use crate::tree::{NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub logo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Character input
    Char(char),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MouseMove { x: f32, y: f32 },
    MouseDown { x: f32, y: f32, button: MouseButton },
    MouseUp { x: f32, y: f32, button: MouseButton },
    Scroll {
        x: f32,
        y: f32,
        /// Horizontal delta in pixels (positive = right)
        delta_x: f32,
        /// Vertical delta in pixels (positive = down)
        delta_y: f32,
    },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    /// The pointer entered this node's rectangle.
    HoverGained,
    /// The pointer left this node's rectangle, or the node stopped being
    /// reachable by it.
    HoverLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl EventResponse {
    pub fn is_handled(self) -> bool {
        self == EventResponse::Handled
    }
}

impl Event {
    /// Get the coordinates from this event, if any
    pub fn coords(&self) -> Option<(f32, f32)> {
        match self {
            Event::MouseMove { x, y } => Some((*x, *y)),
            Event::MouseDown { x, y, .. } => Some((*x, *y)),
            Event::MouseUp { x, y, .. } => Some((*x, *y)),
            Event::Scroll { x, y, .. } => Some((*x, *y)),
            Event::KeyDown { .. }
            | Event::KeyUp { .. }
            | Event::HoverGained
            | Event::HoverLost => None,
        }
    }

    pub fn position(&self) -> Option<Vector2> {
        self.coords().map(|(x, y)| Vector2::new(x, y))
    }
}

/// Pointer state carried between dispatches.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    pub(crate) drag_target: Option<NodeId>,
}

impl InputState {
    /// Drop every reference to a node that is being freed.
    pub(crate) fn forget(&mut self, id: NodeId) {
        if self.drag_target == Some(id) {
            self.drag_target = None;
        }
    }
}

impl Tree {
    /// Route one input event through the attached tree.
    pub fn dispatch(&mut self, event: &Event) -> EventResponse {
        let Some(root) = self.root else {
            return EventResponse::Ignored;
        };
        trace!("dispatch {:?}", event);

        match event {
            Event::MouseDown { x, y, .. } => {
                let handler = self.dispatch_positional(root, Vector2::new(*x, *y), event);
                if let Some(handler) = handler {
                    debug!("drag started on {}", self.describe(handler));
                    self.input.drag_target = Some(handler);
                }
                handled(handler.is_some())
            }
            Event::Scroll { x, y, .. } => {
                handled(self.dispatch_positional(root, Vector2::new(*x, *y), event).is_some())
            }
            Event::MouseUp { x, y, .. } => match self.take_drag_target() {
                Some(target) => {
                    debug!("drag ended on {}", self.describe(target));
                    self.deliver(target, event)
                }
                None => {
                    handled(self.dispatch_positional(root, Vector2::new(*x, *y), event).is_some())
                }
            },
            Event::MouseMove { x, y } => match self.live_drag_target() {
                Some(target) => self.deliver(target, event),
                None => handled(self.broadcast_move(root, Vector2::new(*x, *y), event, true)),
            },
            Event::KeyDown { .. } | Event::KeyUp { .. } => self.dispatch_key(root, event),
            // Hover notifications are synthesized here, never routed.
            Event::HoverGained | Event::HoverLost => EventResponse::Ignored,
        }
    }

    /// The node currently receiving drag events, if any.
    pub fn drag_target(&self) -> Option<NodeId> {
        self.input.drag_target
    }

    /// Drag target, dropped if it was detached since the drag started.
    fn live_drag_target(&mut self) -> Option<NodeId> {
        let target = self.input.drag_target?;
        if self.is_attached(target) {
            return Some(target);
        }
        debug!("drag target {:?} is gone, dropping drag", target);
        self.input.drag_target = None;
        None
    }

    fn take_drag_target(&mut self) -> Option<NodeId> {
        let target = self.live_drag_target();
        self.input.drag_target = None;
        target
    }

    fn deliver(&mut self, id: NodeId, event: &Event) -> EventResponse {
        self.with_behavior(id, |behavior, tree| behavior.event(tree, id, event))
            .unwrap_or(EventResponse::Ignored)
    }

    /// Children of `id`, topmost first.
    fn input_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = self.draw_order(id);
        order.reverse();
        order
    }

    /// Returns the node that handled the event.
    fn dispatch_positional(&mut self, id: NodeId, point: Vector2, event: &Event) -> Option<NodeId> {
        let node = self.slot(id)?;
        if !node.loaded || node.draw_info.draw_alpha <= 0.0 {
            return None;
        }
        let inside = node.draw_info.rect.contains(point);
        if node.props.masking && !inside {
            return None;
        }

        for child in self.input_order(id) {
            if self.parent(child) != Some(id) {
                continue;
            }
            if let Some(handler) = self.dispatch_positional(child, point, event) {
                return Some(handler);
            }
        }

        if inside && self.contains(id) && self.deliver(id, event).is_handled() {
            trace!("{} handled {:?}", self.describe(id), event);
            return Some(id);
        }
        None
    }

    /// Send a move to `id` and everything below it, updating hover state.
    /// `reachable` is false inside invisible subtrees and outside masks.
    fn broadcast_move(
        &mut self,
        id: NodeId,
        point: Vector2,
        event: &Event,
        reachable: bool,
    ) -> bool {
        let Some(node) = self.slot(id) else {
            return false;
        };
        if !node.loaded {
            return false;
        }
        let visible = reachable && node.draw_info.draw_alpha > 0.0;
        let inside = node.draw_info.rect.contains(point);
        let hovered = visible && inside;
        let was_hovered = node.hovered;
        let children_reachable = visible && (inside || !node.props.masking);

        let mut any = false;
        if visible {
            any |= self.deliver(id, event).is_handled();
        }
        if hovered != was_hovered {
            if let Some(node) = self.slot_mut(id) {
                node.hovered = hovered;
            }
            let notice = if hovered {
                Event::HoverGained
            } else {
                Event::HoverLost
            };
            trace!("{} {:?}", self.describe(id), notice);
            any |= self.deliver(id, &notice).is_handled();
        }

        for child in self.input_order(id) {
            if self.parent(child) == Some(id) {
                any |= self.broadcast_move(child, point, event, children_reachable);
            }
        }
        any
    }

    fn dispatch_key(&mut self, id: NodeId, event: &Event) -> EventResponse {
        if !self.slot(id).is_some_and(|node| node.loaded) {
            return EventResponse::Ignored;
        }
        if self.deliver(id, event).is_handled() {
            return EventResponse::Handled;
        }
        let mut any = false;
        for child in self.input_order(id) {
            if self.parent(child) == Some(id) {
                any |= self.dispatch_key(child, event).is_handled();
            }
        }
        handled(any)
    }
}

fn handled(yes: bool) -> EventResponse {
    if yes {
        EventResponse::Handled
    } else {
        EventResponse::Ignored
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::node::{container, drawable};

    type Log = Rc<RefCell<Vec<(&'static str, Event)>>>;

    fn recorder(
        name: &'static str,
        log: &Log,
        response: EventResponse,
    ) -> impl FnMut(&mut Tree, NodeId, &Event) -> EventResponse {
        let log = Rc::clone(log);
        move |_tree: &mut Tree, _id: NodeId, event: &Event| {
            log.borrow_mut().push((name, event.clone()));
            response
        }
    }

    fn down(x: f32, y: f32) -> Event {
        Event::MouseDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    fn names(log: &Log) -> Vec<&'static str> {
        log.borrow().iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_topmost_child_wins() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((100.0, 100.0)));
        let back = tree.insert(
            drawable()
                .size((50.0, 50.0))
                .depth(1.0)
                .behavior(recorder("back", &log, EventResponse::Handled)),
        );
        let front = tree.insert(
            drawable()
                .size((50.0, 50.0))
                .depth(0.0)
                .behavior(recorder("front", &log, EventResponse::Handled)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, back).unwrap();
        tree.add_child(root, front).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&down(10.0, 10.0)), EventResponse::Handled);
        assert_eq!(names(&log), vec!["front"]);
        assert_eq!(tree.drag_target(), Some(front));
    }

    #[test]
    fn test_ignored_falls_through_to_parent() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(
            container()
                .size((100.0, 100.0))
                .behavior(recorder("root", &log, EventResponse::Handled)),
        );
        let child = tree.insert(
            drawable()
                .size((50.0, 50.0))
                .behavior(recorder("child", &log, EventResponse::Ignored)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        tree.update();

        tree.dispatch(&down(10.0, 10.0));
        assert_eq!(names(&log), vec!["child", "root"]);

        log.borrow_mut().clear();
        tree.dispatch(&Event::MouseUp {
            x: 0.0,
            y: 0.0,
            button: MouseButton::Left,
        });
        tree.dispatch(&down(80.0, 80.0));
        assert_eq!(names(&log), vec!["root", "root"]);
    }

    #[test]
    fn test_drag_captures_move_and_up() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((200.0, 200.0)));
        let handle = tree.insert(
            drawable()
                .size((20.0, 20.0))
                .behavior(recorder("handle", &log, EventResponse::Handled)),
        );
        let other = tree.insert(
            drawable()
                .position((100.0, 100.0))
                .size((20.0, 20.0))
                .behavior(recorder("other", &log, EventResponse::Ignored)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, handle).unwrap();
        tree.add_child(root, other).unwrap();
        tree.update();

        tree.dispatch(&down(5.0, 5.0));
        tree.dispatch(&Event::MouseMove { x: 110.0, y: 110.0 });
        tree.dispatch(&Event::MouseUp {
            x: 110.0,
            y: 110.0,
            button: MouseButton::Left,
        });
        assert_eq!(names(&log), vec!["handle", "handle", "handle"]);
        assert_eq!(tree.drag_target(), None);
    }

    #[test]
    fn test_disposed_drag_target_is_dropped() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((100.0, 100.0)));
        let child = tree.insert(
            drawable()
                .size((50.0, 50.0))
                .behavior(recorder("child", &log, EventResponse::Handled)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
        tree.update();

        tree.dispatch(&down(1.0, 1.0));
        tree.dispose(child).unwrap();
        assert_eq!(tree.drag_target(), None);
        assert_eq!(
            tree.dispatch(&Event::MouseMove { x: 1.0, y: 1.0 }),
            EventResponse::Ignored
        );
    }

    #[test]
    fn test_hover_gained_and_lost_in_one_pass() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((200.0, 100.0)));
        let left = tree.insert(
            drawable()
                .size((100.0, 100.0))
                .behavior(recorder("left", &log, EventResponse::Ignored)),
        );
        let right = tree.insert(
            drawable()
                .position((100.0, 0.0))
                .size((100.0, 100.0))
                .behavior(recorder("right", &log, EventResponse::Ignored)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, left).unwrap();
        tree.add_child(root, right).unwrap();
        tree.update();

        tree.dispatch(&Event::MouseMove { x: 10.0, y: 10.0 });
        assert!(tree.node(left).unwrap().is_hovered());
        assert!(!tree.node(right).unwrap().is_hovered());

        log.borrow_mut().clear();
        tree.dispatch(&Event::MouseMove { x: 150.0, y: 10.0 });
        let events = log.borrow().clone();
        assert!(events.contains(&("left", Event::HoverLost)));
        assert!(events.contains(&("right", Event::HoverGained)));
        assert!(events.contains(&("left", Event::MouseMove { x: 150.0, y: 10.0 })));
        assert!(tree.node(right).unwrap().is_hovered());
    }

    #[test]
    fn test_masking_hides_children_outside() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((200.0, 200.0)));
        let mask = tree.insert(container().size((50.0, 50.0)).masking(true));
        let overflow = tree.insert(
            drawable()
                .size((150.0, 150.0))
                .behavior(recorder("overflow", &log, EventResponse::Handled)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, mask).unwrap();
        tree.add_child(mask, overflow).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&down(100.0, 100.0)), EventResponse::Ignored);
        tree.dispatch(&Event::MouseMove { x: 100.0, y: 100.0 });
        assert!(!tree.node(overflow).unwrap().is_hovered());
        assert!(names(&log).is_empty());

        assert_eq!(tree.dispatch(&down(10.0, 10.0)), EventResponse::Handled);
    }

    #[test]
    fn test_invisible_nodes_get_no_pointer_input() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(container().size((100.0, 100.0)));
        let ghost = tree.insert(
            drawable()
                .size((100.0, 100.0))
                .alpha(0.0)
                .behavior(recorder("ghost", &log, EventResponse::Handled)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, ghost).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&down(10.0, 10.0)), EventResponse::Ignored);
        tree.dispatch(&Event::MouseMove { x: 10.0, y: 10.0 });
        assert!(names(&log).is_empty());
    }

    fn key_a() -> Event {
        Event::KeyDown {
            key: Key::Char('a'),
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn test_keys_reach_parent_first_then_every_child() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(
            container().behavior(recorder("root", &log, EventResponse::Ignored)),
        );
        let a = tree.insert(drawable().behavior(recorder("a", &log, EventResponse::Handled)));
        let b = tree.insert(drawable().behavior(recorder("b", &log, EventResponse::Handled)));
        tree.set_root(root).unwrap();
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&key_a()), EventResponse::Handled);
        // Equal depth: the later child is on top, and a handled sibling does
        // not stop the next one.
        assert_eq!(names(&log), vec!["root", "b", "a"]);
    }

    #[test]
    fn test_key_handled_by_any_descendant_is_handled() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(
            container().behavior(recorder("root", &log, EventResponse::Ignored)),
        );
        let group = tree.insert(
            container().behavior(recorder("group", &log, EventResponse::Ignored)),
        );
        let leaf = tree.insert(drawable().behavior(recorder("leaf", &log, EventResponse::Handled)));
        let other = tree.insert(
            drawable().behavior(recorder("other", &log, EventResponse::Ignored)),
        );
        tree.set_root(root).unwrap();
        tree.add_child(root, group).unwrap();
        tree.add_child(group, leaf).unwrap();
        tree.add_child(root, other).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&key_a()), EventResponse::Handled);
        assert_eq!(names(&log), vec!["root", "other", "group", "leaf"]);
    }

    #[test]
    fn test_key_handled_by_parent_skips_children() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(
            container().behavior(recorder("root", &log, EventResponse::Handled)),
        );
        let a = tree.insert(drawable().behavior(recorder("a", &log, EventResponse::Handled)));
        tree.set_root(root).unwrap();
        tree.add_child(root, a).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&key_a()), EventResponse::Handled);
        assert_eq!(names(&log), vec!["root"]);
    }

    #[test]
    fn test_key_nobody_handles_is_ignored() {
        let log: Log = Rc::default();
        let mut tree = Tree::new(ManualClock::new());
        let root = tree.insert(
            container().behavior(recorder("root", &log, EventResponse::Ignored)),
        );
        let a = tree.insert(drawable().behavior(recorder("a", &log, EventResponse::Ignored)));
        tree.set_root(root).unwrap();
        tree.add_child(root, a).unwrap();
        tree.update();

        assert_eq!(tree.dispatch(&key_a()), EventResponse::Ignored);
        assert_eq!(names(&log), vec!["root", "a"]);
    }

    #[test]
    fn test_no_root_ignores_everything() {
        let mut tree = Tree::new(ManualClock::new());
        assert_eq!(tree.dispatch(&down(0.0, 0.0)), EventResponse::Ignored);
    }
}
