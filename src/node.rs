//! Node construction and per-node accessors.
//!
//! Nodes are described with the [`Drawable`] builder ([`drawable()`] for
//! leaves, [`container()`] for nodes that hold children), inserted into a
//! [`Tree`], and afterwards read through [`NodeRef`] and changed through
//! [`NodeMut`]. Every `NodeMut` setter stores and invalidates only when the
//! value really changes (beyond the tree's epsilon for floats), so assigning
//! the same value every frame costs nothing.
//!
//! ```ignore
//! let panel = tree.insert(
//!     container()
//!         .anchor(Anchor::Centre)
//!         .origin(Anchor::Centre)
//!         .relative_size_axes(Axes::BOTH)
//!         .size((0.5, 0.5))
//!         .padding(8.0),
//! );
//! tree.node_mut(panel).unwrap().set_alpha(0.5);
//! ```

use log::error;

use crate::animation::{PropertyValue, Transform};
use crate::behavior::Behavior;
use crate::clock::{Clock, FramedClock};
use crate::color::Color;
use crate::draw::TextureId;
use crate::error::Result;
use crate::geometry::{Anchor, Axes, MarginPadding, Rect, Vector2};
use crate::invalidation::{changed, ApproxEq, Invalidation};
use crate::layout::DrawInfo;
use crate::matrix::Matrix;
use crate::scheduler::{Scheduler, TaskId};
use crate::tree::{NodeId, Tree};

/// User-settable state of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    /// Point within the parent that `position` is measured from.
    pub anchor: Anchor,
    /// Point within the node that is pinned to the anchor.
    pub origin: Anchor,
    pub position: Vector2,
    pub relative_position_axes: Axes,
    pub size: Vector2,
    pub relative_size_axes: Axes,
    pub scale: Vector2,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub margin: MarginPadding,
    pub padding: MarginPadding,
    pub relative_padding_axes: Axes,
    pub color: Color,
    pub alpha: f32,
    /// Higher depth is drawn first (further back) and probed for input last.
    pub depth: f32,
    /// Clip children to this node's rectangle, for drawing and input.
    pub masking: bool,
    pub texture: Option<TextureId>,
    pub label: Option<String>,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            anchor: Anchor::TopLeft,
            origin: Anchor::TopLeft,
            position: Vector2::ZERO,
            relative_position_axes: Axes::empty(),
            size: Vector2::ZERO,
            relative_size_axes: Axes::empty(),
            scale: Vector2::ONE,
            rotation: 0.0,
            margin: MarginPadding::ZERO,
            padding: MarginPadding::ZERO,
            relative_padding_axes: Axes::empty(),
            color: Color::WHITE,
            alpha: 1.0,
            depth: 0.0,
            masking: false,
            texture: None,
            label: None,
        }
    }
}

/// Child bookkeeping, present only on containers.
#[derive(Debug, Default)]
pub(crate) struct Children {
    /// Insertion order.
    pub(crate) list: Vec<NodeId>,
    /// Depth-sorted copy of `list`, valid while `order_dirty` is false.
    pub(crate) draw_order: Vec<NodeId>,
    pub(crate) order_dirty: bool,
}

pub(crate) struct Node {
    pub(crate) props: Properties,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<Children>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) draw_info: DrawInfo,
    pub(crate) invalidation: Invalidation,
    /// `None` until loaded.
    pub(crate) clock: Option<FramedClock>,
    /// Clock settings made before load, applied when the clock is created.
    pub(crate) clock_rate: f64,
    pub(crate) clock_running: bool,
    pub(crate) scheduler: Scheduler<Tree>,
    pub(crate) transforms: Vec<Transform>,
    /// Added to the start time of transforms queued through the helpers.
    pub(crate) transform_delay: f64,
    pub(crate) loaded: bool,
    pub(crate) hovered: bool,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    pub(crate) sparse_index: u32,
}

/// Builder for a node that has not been inserted yet.
pub struct Drawable {
    props: Properties,
    is_container: bool,
    behavior: Option<Box<dyn Behavior>>,
    clock_rate: f64,
    clock_running: bool,
}

/// A leaf node.
pub fn drawable() -> Drawable {
    Drawable {
        props: Properties::default(),
        is_container: false,
        behavior: None,
        clock_rate: 1.0,
        clock_running: true,
    }
}

/// A node that can hold children.
pub fn container() -> Drawable {
    Drawable {
        is_container: true,
        ..drawable()
    }
}

impl Drawable {
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.props.anchor = anchor;
        self
    }

    pub fn origin(mut self, origin: Anchor) -> Self {
        self.props.origin = origin;
        self
    }

    pub fn position(mut self, position: impl Into<Vector2>) -> Self {
        self.props.position = position.into();
        self
    }

    pub fn relative_position_axes(mut self, axes: Axes) -> Self {
        self.props.relative_position_axes = axes;
        self
    }

    pub fn size(mut self, size: impl Into<Vector2>) -> Self {
        self.props.size = size.into();
        self
    }

    pub fn relative_size_axes(mut self, axes: Axes) -> Self {
        self.props.relative_size_axes = axes;
        self
    }

    pub fn scale(mut self, scale: impl Into<Vector2>) -> Self {
        self.props.scale = scale.into();
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.props.rotation = degrees;
        self
    }

    pub fn margin(mut self, margin: impl Into<MarginPadding>) -> Self {
        self.props.margin = margin.into();
        self
    }

    pub fn padding(mut self, padding: impl Into<MarginPadding>) -> Self {
        self.props.padding = padding.into();
        self
    }

    pub fn relative_padding_axes(mut self, axes: Axes) -> Self {
        self.props.relative_padding_axes = axes;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.props.color = color;
        self
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.props.alpha = clamp_alpha(alpha);
        self
    }

    pub fn depth(mut self, depth: f32) -> Self {
        self.props.depth = depth;
        self
    }

    pub fn masking(mut self, masking: bool) -> Self {
        self.props.masking = masking;
        self
    }

    pub fn texture(mut self, texture: TextureId) -> Self {
        self.props.texture = Some(texture);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.props.label = Some(label.into());
        self
    }

    pub fn behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn clock_rate(mut self, rate: f64) -> Self {
        self.clock_rate = rate;
        self
    }

    pub(crate) fn into_node(self, sparse_index: u32) -> Node {
        Node {
            props: self.props,
            parent: None,
            children: self.is_container.then(Children::default),
            behavior: self.behavior,
            draw_info: DrawInfo::default(),
            invalidation: Invalidation::ALL,
            clock: None,
            clock_rate: self.clock_rate,
            clock_running: self.clock_running,
            scheduler: Scheduler::new(),
            transforms: Vec::new(),
            transform_delay: 0.0,
            loaded: false,
            hovered: false,
            sparse_index,
        }
    }
}

fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

/// Read access to one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId, node: &'a Node) -> Self {
        Self { tree, id, node }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn properties(&self) -> &'a Properties {
        &self.node.props
    }

    pub fn label(&self) -> Option<&'a str> {
        self.node.props.label.as_deref()
    }

    pub fn anchor(&self) -> Anchor {
        self.node.props.anchor
    }

    pub fn origin(&self) -> Anchor {
        self.node.props.origin
    }

    pub fn position(&self) -> Vector2 {
        self.node.props.position
    }

    pub fn size(&self) -> Vector2 {
        self.node.props.size
    }

    pub fn scale(&self) -> Vector2 {
        self.node.props.scale
    }

    pub fn rotation(&self) -> f32 {
        self.node.props.rotation
    }

    pub fn color(&self) -> Color {
        self.node.props.color
    }

    pub fn alpha(&self) -> f32 {
        self.node.props.alpha
    }

    pub fn depth(&self) -> f32 {
        self.node.props.depth
    }

    pub fn draw_info(&self) -> &'a DrawInfo {
        &self.node.draw_info
    }

    /// Final pixel size, before scale and rotation.
    pub fn draw_size(&self) -> Vector2 {
        self.node.draw_info.draw_size
    }

    /// Axis-aligned screen-space bounds.
    pub fn draw_rect(&self) -> Rect {
        self.node.draw_info.rect
    }

    /// Maps the unit quad to screen space.
    pub fn model_matrix(&self) -> Matrix {
        self.node.draw_info.model_matrix
    }

    pub fn draw_alpha(&self) -> f32 {
        self.node.draw_info.draw_alpha
    }

    /// Content area offered to children: draw size minus padding.
    pub fn child_size(&self) -> Vector2 {
        self.node.draw_info.child_size
    }

    /// Hit test against the draw rectangle. Rotated nodes are tested against
    /// their axis-aligned bounds.
    pub fn contains(&self, point: Vector2) -> bool {
        self.node.draw_info.rect.contains(point)
    }

    pub fn invalidation(&self) -> Invalidation {
        self.node.invalidation
    }

    pub fn is_loaded(&self) -> bool {
        self.node.loaded
    }

    pub fn is_container(&self) -> bool {
        self.node.children.is_some()
    }

    pub fn is_hovered(&self) -> bool {
        self.node.hovered
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn children(&self) -> &'a [NodeId] {
        self.tree.children(self.id)
    }

    pub fn clock(&self) -> Option<&'a FramedClock> {
        self.node.clock.as_ref()
    }

    /// Current time of this node's clock, if loaded.
    pub fn time(&self) -> Option<f64> {
        self.node.clock.as_ref().map(|clock| clock.current_time())
    }

    pub fn transforms(&self) -> &'a [Transform] {
        &self.node.transforms
    }

    pub fn transform_delay(&self) -> f64 {
        self.node.transform_delay
    }

    /// Number of scheduled tasks still waiting to run.
    pub fn scheduled_tasks(&self) -> usize {
        self.node.scheduler.len()
    }
}

/// Write access to one node.
///
/// Holds the whole tree mutably, because changing a node may invalidate its
/// parent.
pub struct NodeMut<'a> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) id: NodeId,
    index: usize,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: NodeId, index: usize) -> Self {
        Self { tree, id, index }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> NodeRef<'_> {
        NodeRef::new(self.tree, self.id, &self.tree.dense[self.index])
    }

    pub fn tree(&mut self) -> &mut Tree {
        self.tree
    }

    pub(crate) fn inner(&mut self) -> &mut Node {
        &mut self.tree.dense[self.index]
    }

    pub fn invalidate(&mut self, flags: Invalidation) -> bool {
        self.tree.invalidate(self.id, flags, true)
    }

    /// Store `value` and invalidate with `flags` if it differs from the
    /// current value beyond epsilon. Smaller changes are dropped, so the
    /// stored value never drifts away from the one last laid out.
    fn assign<T>(
        &mut self,
        value: T,
        flags: Invalidation,
        field: fn(&mut Properties) -> &mut T,
    ) -> &mut Self
    where
        T: ApproxEq,
    {
        let epsilon = self.tree.config.epsilon;
        self.write(value, flags, field, |current, new| changed(current, new, epsilon))
    }

    /// Store `value` bit for bit, invalidating on any difference.
    fn assign_exact<T>(
        &mut self,
        value: T,
        flags: Invalidation,
        field: fn(&mut Properties) -> &mut T,
    ) -> &mut Self
    where
        T: PartialEq,
    {
        self.write(value, flags, field, |current, new| current != new)
    }

    fn write<T>(
        &mut self,
        value: T,
        flags: Invalidation,
        field: fn(&mut Properties) -> &mut T,
        differs: impl Fn(&T, &T) -> bool,
    ) -> &mut Self {
        let slot = field(&mut self.inner().props);
        if !differs(slot, &value) {
            return self;
        }
        *slot = value;
        self.tree.invalidate(self.id, flags, true);
        self
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> &mut Self {
        self.assign(anchor, Invalidation::DRAW_INFO, |p| &mut p.anchor)
    }

    pub fn set_origin(&mut self, origin: Anchor) -> &mut Self {
        self.assign(origin, Invalidation::DRAW_INFO, |p| &mut p.origin)
    }

    pub fn set_position(&mut self, position: impl Into<Vector2>) -> &mut Self {
        self.assign(position.into(), Invalidation::DRAW_INFO, |p| &mut p.position)
    }

    pub fn set_relative_position_axes(&mut self, axes: Axes) -> &mut Self {
        self.assign(axes, Invalidation::DRAW_INFO, |p| &mut p.relative_position_axes)
    }

    pub fn set_size(&mut self, size: impl Into<Vector2>) -> &mut Self {
        self.assign(size.into(), Invalidation::DRAW_INFO, |p| &mut p.size)
    }

    pub fn set_relative_size_axes(&mut self, axes: Axes) -> &mut Self {
        self.assign(axes, Invalidation::DRAW_INFO, |p| &mut p.relative_size_axes)
    }

    pub fn set_scale(&mut self, scale: impl Into<Vector2>) -> &mut Self {
        self.assign(scale.into(), Invalidation::DRAW_INFO, |p| &mut p.scale)
    }

    pub fn set_rotation(&mut self, degrees: f32) -> &mut Self {
        self.assign(degrees, Invalidation::DRAW_INFO, |p| &mut p.rotation)
    }

    pub fn set_margin(&mut self, margin: impl Into<MarginPadding>) -> &mut Self {
        self.assign(margin.into(), Invalidation::DRAW_INFO, |p| &mut p.margin)
    }

    pub fn set_padding(&mut self, padding: impl Into<MarginPadding>) -> &mut Self {
        self.assign(padding.into(), Invalidation::DRAW_INFO, |p| &mut p.padding)
    }

    pub fn set_relative_padding_axes(&mut self, axes: Axes) -> &mut Self {
        self.assign(axes, Invalidation::DRAW_INFO, |p| &mut p.relative_padding_axes)
    }

    pub fn set_masking(&mut self, masking: bool) -> &mut Self {
        self.assign(masking, Invalidation::DRAW_INFO, |p| &mut p.masking)
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.assign(color, Invalidation::COLOUR, |p| &mut p.color)
    }

    /// Clamped to `0..=1`.
    pub fn set_alpha(&mut self, alpha: f32) -> &mut Self {
        self.assign(clamp_alpha(alpha), Invalidation::COLOUR, |p| &mut p.alpha)
    }

    /// Depth only matters to the parent's ordering: the node itself is not
    /// invalidated, its parent is.
    pub fn set_depth(&mut self, depth: f32) -> &mut Self {
        let epsilon = self.tree.config.epsilon;
        let props = &mut self.inner().props;
        if !changed(&props.depth, &depth, epsilon) {
            return self;
        }
        props.depth = depth;
        self.tree.depth_changed(self.id);
        self
    }

    pub fn set_texture(&mut self, texture: Option<TextureId>) -> &mut Self {
        if self.inner().props.texture != texture {
            self.inner().props.texture = texture;
            self.tree.invalidate(self.id, Invalidation::COLOUR, true);
        }
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.inner().props.label = Some(label.into());
        self
    }

    pub fn set_behavior(&mut self, behavior: impl Behavior + 'static) -> &mut Self {
        self.inner().behavior = Some(Box::new(behavior));
        self
    }

    /// Write one animatable property through its setter.
    pub fn set_value(&mut self, value: PropertyValue) -> &mut Self {
        match value {
            PropertyValue::Position(v) => self.set_position(v),
            PropertyValue::Size(v) => self.set_size(v),
            PropertyValue::Scale(v) => self.set_scale(v),
            PropertyValue::Alpha(v) => self.set_alpha(v),
            PropertyValue::Colour(v) => self.set_color(v),
            PropertyValue::Rotation(v) => self.set_rotation(v),
        }
    }

    /// Write the final value of a transform exactly, even when it is within
    /// epsilon of the stored one.
    pub(crate) fn set_end_value(&mut self, value: PropertyValue) -> &mut Self {
        let geometry = Invalidation::DRAW_INFO;
        let colour = Invalidation::COLOUR;
        match value {
            PropertyValue::Position(v) => self.assign_exact(v, geometry, |p| &mut p.position),
            PropertyValue::Size(v) => self.assign_exact(v, geometry, |p| &mut p.size),
            PropertyValue::Scale(v) => self.assign_exact(v, geometry, |p| &mut p.scale),
            PropertyValue::Alpha(v) => self.assign_exact(clamp_alpha(v), colour, |p| &mut p.alpha),
            PropertyValue::Colour(v) => self.assign_exact(v, colour, |p| &mut p.color),
            PropertyValue::Rotation(v) => self.assign_exact(v, geometry, |p| &mut p.rotation),
        }
    }

    /// Speed of this node's clock relative to its parent's. Applies to the
    /// whole subtree, since children are driven by this clock.
    pub fn set_clock_rate(&mut self, rate: f64) -> &mut Self {
        let node = self.inner();
        node.clock_rate = rate;
        if let Some(clock) = node.clock.as_mut() {
            clock.set_rate(rate);
        }
        self
    }

    /// Freeze this node's time (and with it the whole subtree's).
    pub fn stop_clock(&mut self) -> &mut Self {
        let node = self.inner();
        node.clock_running = false;
        if let Some(clock) = node.clock.as_mut() {
            clock.stop();
        }
        self
    }

    pub fn start_clock(&mut self) -> &mut Self {
        let node = self.inner();
        node.clock_running = true;
        if let Some(clock) = node.clock.as_mut() {
            clock.start();
        }
        self
    }

    fn scheduled(
        &self,
        result: std::result::Result<TaskId, crate::error::SchedulerError>,
    ) -> Result<TaskId> {
        result.map_err(|err| {
            error!("cannot schedule on {}: {}", self.tree.describe(self.id), err);
            err.into()
        })
    }

    /// Run `task` on the next update of this node.
    pub fn schedule<F>(&mut self, task: F) -> Result<TaskId>
    where
        F: FnMut(&mut Tree) + 'static,
    {
        let result = self.inner().scheduler.add(task);
        self.scheduled(result)
    }

    /// Run `task` once, `delay` ms from now on this node's clock.
    pub fn schedule_delayed<F>(&mut self, delay: f64, task: F) -> Result<TaskId>
    where
        F: FnMut(&mut Tree) + 'static,
    {
        let result = self.inner().scheduler.add_delayed(delay, task);
        self.scheduled(result)
    }

    /// Run `task` every `interval` ms on this node's clock.
    pub fn schedule_repeating<F>(&mut self, interval: f64, task: F) -> Result<TaskId>
    where
        F: FnMut(&mut Tree) + 'static,
    {
        let result = self.inner().scheduler.add_repeating(interval, task);
        self.scheduled(result)
    }

    pub fn cancel_task(&mut self, task: TaskId) -> bool {
        self.inner().scheduler.cancel(task)
    }

    pub fn cancel_all_tasks(&mut self) -> &mut Self {
        self.inner().scheduler.cancel_all();
        self
    }
}
