use crate::dependencies::Dependencies;
use crate::input::{Event, EventResponse};
use crate::tree::{NodeId, Tree};

/// Custom logic attached to a node.
///
/// The behavior is taken out of its node while a hook runs, so hooks get the
/// whole tree mutably and may restructure it, add transforms to themselves or
/// schedule tasks. Every hook has a no-op default.
pub trait Behavior {
    /// Called once, when the node first becomes part of a loaded tree. The
    /// node's clock and scheduler are already set up.
    fn load(&mut self, tree: &mut Tree, id: NodeId, dependencies: &Dependencies) {
        let _ = (tree, id, dependencies);
    }

    /// Called every frame after scheduled tasks and transforms ran, before
    /// geometry is recomputed.
    fn update(&mut self, tree: &mut Tree, id: NodeId) {
        let _ = (tree, id);
    }

    fn event(&mut self, tree: &mut Tree, id: NodeId, event: &Event) -> EventResponse {
        let _ = (tree, id, event);
        EventResponse::Ignored
    }

    /// Add services visible to this node's descendants while they load.
    fn provide(&self, dependencies: &mut Dependencies) {
        let _ = dependencies;
    }
}

impl<F> Behavior for F
where
    F: FnMut(&mut Tree, NodeId, &Event) -> EventResponse,
{
    fn event(&mut self, tree: &mut Tree, id: NodeId, event: &Event) -> EventResponse {
        self(tree, id, event)
    }
}
