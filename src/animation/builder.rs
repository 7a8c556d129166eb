//! Fluent transform helpers on [`NodeMut`].
//!
//! Every helper queues a [`Transform`] starting at the node's current time
//! plus the accumulated [`delay`](NodeMut::delay), so chains read as a
//! timeline:
//!
//! ```ignore
//! node.fade_in(100.0, Easing::None)
//!     .delay(100.0)
//!     .scale_to(2.0, 250.0, Easing::OutQuad)
//!     .delay(250.0)
//!     .fade_out(100.0, Easing::None);
//! ```
//!
//! On a node that is not loaded yet, times are relative to zero and shifted
//! onto the node's clock when it loads.

use crate::clock::Clock;
use crate::color::Color;
use crate::easing::Easing;
use crate::geometry::Vector2;
use crate::node::NodeMut;
use crate::tree::{NodeId, Tree};

use super::{Transform, TransformTarget};

impl NodeMut<'_> {
    /// Start time for helper-queued transforms.
    fn transform_start(&mut self) -> f64 {
        let node = self.inner();
        let now = node.clock.as_ref().map_or(0.0, |clock| clock.current_time());
        now + node.transform_delay
    }

    /// Queue a transform with explicit times on this node's clock.
    pub fn add_transform(&mut self, transform: Transform) -> &mut Self {
        self.inner().transforms.push(transform);
        self
    }

    /// Push the start of subsequently queued helpers back by `ms`.
    pub fn delay(&mut self, ms: f64) -> &mut Self {
        self.inner().transform_delay += ms;
        self
    }

    pub fn delay_reset(&mut self) -> &mut Self {
        self.inner().transform_delay = 0.0;
        self
    }

    /// Tween `target` over `duration` ms from now (plus delay).
    pub fn tween(&mut self, target: TransformTarget, duration: f64, easing: Easing) -> &mut Self {
        let start = self.transform_start();
        self.add_transform(Transform::new(target, start, start + duration).easing(easing))
    }

    /// Like [`tween`](Self::tween), repeating every `duration` ms until cleared.
    pub fn tween_looping(
        &mut self,
        target: TransformTarget,
        duration: f64,
        easing: Easing,
    ) -> &mut Self {
        let start = self.transform_start();
        self.add_transform(
            Transform::new(target, start, start + duration)
                .easing(easing)
                .looping(),
        )
    }

    pub fn fade_to(&mut self, alpha: f32, duration: f64, easing: Easing) -> &mut Self {
        self.tween(TransformTarget::alpha(alpha), duration, easing)
    }

    pub fn fade_in(&mut self, duration: f64, easing: Easing) -> &mut Self {
        self.fade_to(1.0, duration, easing)
    }

    pub fn fade_out(&mut self, duration: f64, easing: Easing) -> &mut Self {
        self.fade_to(0.0, duration, easing)
    }

    pub fn move_to(
        &mut self,
        position: impl Into<Vector2>,
        duration: f64,
        easing: Easing,
    ) -> &mut Self {
        self.tween(TransformTarget::position(position), duration, easing)
    }

    pub fn resize_to(
        &mut self,
        size: impl Into<Vector2>,
        duration: f64,
        easing: Easing,
    ) -> &mut Self {
        self.tween(TransformTarget::size(size), duration, easing)
    }

    pub fn scale_to(
        &mut self,
        scale: impl Into<Vector2>,
        duration: f64,
        easing: Easing,
    ) -> &mut Self {
        self.tween(TransformTarget::scale(scale), duration, easing)
    }

    pub fn rotate_to(&mut self, degrees: f32, duration: f64, easing: Easing) -> &mut Self {
        self.tween(TransformTarget::rotation(degrees), duration, easing)
    }

    pub fn fade_colour(&mut self, colour: Color, duration: f64, easing: Easing) -> &mut Self {
        self.tween(TransformTarget::colour(colour), duration, easing)
    }

    /// Drop every queued transform, leaving properties where they are. With
    /// `cascade`, the whole subtree is cleared.
    pub fn clear_transforms(&mut self, cascade: bool) -> &mut Self {
        let id = self.id();
        for target in targets(self.tree(), id, cascade) {
            if let Some(node) = self.tree().slot_mut(target) {
                node.transforms.clear();
            }
        }
        self
    }

    /// Jump every non-looping transform to its end value and drop it, in
    /// queue order. Looping transforms have no end and are kept.
    pub fn finish_transforms(&mut self, cascade: bool) -> &mut Self {
        let id = self.id();
        for target in targets(self.tree(), id, cascade) {
            finish_node(self.tree(), target);
        }
        self
    }
}

fn targets(tree: &Tree, id: NodeId, cascade: bool) -> Vec<NodeId> {
    if cascade {
        tree.descendants(id)
    } else {
        vec![id]
    }
}

fn finish_node(tree: &mut Tree, id: NodeId) {
    let Some(node) = tree.slot_mut(id) else {
        return;
    };
    let (finished, kept): (Vec<Transform>, Vec<Transform>) =
        std::mem::take(&mut node.transforms)
            .into_iter()
            .partition(|transform| !transform.looping);
    node.transforms = kept;

    if let Some(mut node) = tree.node_mut(id) {
        for transform in finished {
            node.set_end_value(transform.target.end_value());
        }
    }
}
