//! Arena storage for the scene graph.
//!
//! The Tree owns every node using a sparse-set architecture with generational
//! indices. Parent/child links are [`NodeId`]s, never references, so a node
//! can be detached, re-attached or disposed without fighting the borrow
//! checker, and stale handles are detected instead of dangling.
//!
//! ## Key Features
//!
//! - **Generational Indices**: NodeId contains index + generation to prevent
//!   ABA problems (detecting stale references to reallocated slots).
//!
//! - **Dense Storage**: Nodes stored contiguously, with O(1) swap-remove.
//!
//! - **Structure checks**: [`Tree::add_child`] rejects self-parenting,
//!   ancestor cycles and non-container parents before touching anything.
//!
//! - **Loading**: a node is loaded the first time it joins a loaded tree. At
//!   that point it gets its framed clock (starting at its parent's time), its
//!   scheduler becomes usable, and its [`Behavior::load`] hook runs with the
//!   [`Dependencies`] its ancestors provided.

use std::fmt;

use log::{debug, error};

use crate::behavior::Behavior;
use crate::clock::{Clock, FramedClock};
use crate::dependencies::Dependencies;
use crate::error::{Result, TreeError};
use crate::input::InputState;
use crate::invalidation::Invalidation;
use crate::node::{Drawable, Node, NodeMut, NodeRef};
use crate::stats::FrameStats;
use crate::TreeConfig;

/// Handle to a node in a [`Tree`].
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after disposal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }
}

/// Entry in the sparse map, pointing to a dense array slot.
struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

pub struct Tree {
    /// Dense array of nodes
    pub(crate) dense: Vec<Node>,
    /// Sparse map from index to dense position + generation
    sparse: Vec<Option<SparseEntry>>,
    /// Reusable sparse indices, with the generation their last occupant had
    free_indices: Vec<(u32, u32)>,
    pub(crate) root: Option<NodeId>,
    pub(crate) config: TreeConfig,
    pub(crate) source: Box<dyn Clock>,
    pub(crate) dependencies: Dependencies,
    pub(crate) input: InputState,
    pub(crate) frame_stats: FrameStats,
    pub(crate) total_stats: FrameStats,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.dense.len())
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

impl Tree {
    /// A tree driven by `source`, with default configuration.
    pub fn new(source: impl Clock + 'static) -> Self {
        Self::with_config(TreeConfig::default(), source)
    }

    pub fn with_config(config: TreeConfig, source: impl Clock + 'static) -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            root: None,
            config,
            source: Box::new(source),
            dependencies: Dependencies::new(),
            input: InputState::default(),
            frame_stats: FrameStats::default(),
            total_stats: FrameStats::default(),
        }
    }

    /// Store a detached node and return its handle.
    pub fn insert(&mut self, drawable: Drawable) -> NodeId {
        let (sparse_index, generation) = match self.free_indices.pop() {
            Some((index, generation)) => (index, generation.wrapping_add(1)),
            None => {
                let index = self.sparse.len() as u32;
                self.sparse.push(None);
                (index, 0)
            }
        };

        let dense_index = self.dense.len();
        let id = NodeId::new(sparse_index, generation);
        self.dense.push(drawable.into_node(sparse_index));
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });
        id
    }

    fn dense_index(&self, id: NodeId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    pub(crate) fn slot(&self, id: NodeId) -> Option<&Node> {
        self.dense_index(id).map(|index| &self.dense[index])
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.dense_index(id).map(move |index| &mut self.dense[index])
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.slot(id).ok_or_else(|| TreeError::StaleNode(id).into())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.dense_index(id).is_some()
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.slot(id).map(|node| NodeRef::new(self, id, node))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        let index = self.dense_index(id)?;
        Some(NodeMut::new(self, id, index))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make `id` the root and load it (and its subtree).
    ///
    /// A previous root stays in the arena, detached.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        if self.require(id)?.parent.is_some() {
            error!("cannot make {} the root: it has a parent", self.describe(id));
            return Err(TreeError::HasParent(id).into());
        }
        debug!("root set to {}", self.describe(id));
        self.root = Some(id);
        self.invalidate(id, Invalidation::ALL, false);
        self.load_subtree(id);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|node| node.parent)
    }

    /// Children in insertion order. Empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id)
            .and_then(|node| node.children.as_ref())
            .map(|children| children.list.as_slice())
            .unwrap_or(&[])
    }

    /// Parent, grandparent and so on up to the top of the node's tree.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// `id` followed by every node below it, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Whether `id` is reachable from the root (and so updated, drawn and
    /// given input).
    pub fn is_attached(&self, id: NodeId) -> bool {
        match self.root {
            Some(root) => self.contains(id) && self.is_descendant_of(id, root),
            None => false,
        }
    }

    /// Attach `child` under `parent`, first detaching it from any other
    /// parent. Adding a node to the parent it already has is a no-op.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.require(parent)?;
        let parent_is_container = parent_node.children.is_some();
        self.require(child)?;

        if parent == child {
            error!("{} cannot be added to itself", self.describe(child));
            return Err(TreeError::SelfParent(child).into());
        }
        if !parent_is_container {
            error!("{} is not a container", self.describe(parent));
            return Err(TreeError::NotAContainer(parent).into());
        }
        if self.root == Some(child) {
            error!("root {} cannot become a child", self.describe(child));
            return Err(TreeError::IsRoot(child).into());
        }
        if self.ancestors(parent).any(|a| a == child) {
            error!(
                "adding {} under {} would create a cycle",
                self.describe(child),
                self.describe(parent)
            );
            return Err(TreeError::Cycle { parent, child }.into());
        }

        match self.parent(child) {
            Some(current) if current == parent => return Ok(()),
            Some(current) => self.unlink(current, child),
            None => {}
        }

        if let Some(node) = self.slot_mut(child) {
            node.parent = Some(parent);
        }
        let mut parent_loaded = false;
        if let Some(node) = self.slot_mut(parent) {
            parent_loaded = node.loaded;
            if let Some(children) = node.children.as_mut() {
                children.list.push(child);
                children.order_dirty = true;
            }
        }
        debug!("attached {} to {}", self.describe(child), self.describe(parent));

        self.invalidate(parent, Invalidation::DRAW_INFO, true);
        if parent_loaded {
            self.load_subtree(child);
        }
        self.invalidate(child, Invalidation::ALL, false);
        Ok(())
    }

    /// Detach `child` from `parent`. Returns `false` if it was not a child of
    /// `parent`. The child is kept in the arena, inert until re-attached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        self.require(parent)?;
        self.require(child)?;
        if self.parent(child) != Some(parent) {
            return Ok(false);
        }
        self.unlink(parent, child);
        Ok(true)
    }

    /// Detach `id` from whatever parent it has.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.require(id)?;
        if let Some(parent) = self.parent(id) {
            self.unlink(parent, id);
        }
        Ok(())
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.slot_mut(parent) {
            if let Some(children) = node.children.as_mut() {
                children.list.retain(|&c| c != child);
                children.draw_order.retain(|&c| c != child);
            }
        }
        if let Some(node) = self.slot_mut(child) {
            node.parent = None;
            node.hovered = false;
        }
        debug!("detached {} from {}", self.describe(child), self.describe(parent));
        self.invalidate(parent, Invalidation::DRAW_INFO, true);
    }

    /// Detach `id` and free it together with its whole subtree. Handles to
    /// any of the freed nodes become stale.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        if self.root == Some(id) {
            self.root = None;
        }

        let mut stack = vec![id];
        let mut freed = 0usize;
        while let Some(current) = stack.pop() {
            stack.extend_from_slice(self.children(current));
            if self.free(current) {
                freed += 1;
            }
        }
        debug!("disposed {:?} ({} nodes)", id, freed);
        Ok(())
    }

    /// Swap-remove a node from dense storage.
    fn free(&mut self, id: NodeId) -> bool {
        let Some(dense_index) = self.dense_index(id) else {
            return false;
        };
        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        if dense_index != last_dense_index {
            let moved_sparse = self.dense[dense_index].sparse_index;
            if let Some(entry) = self.sparse[moved_sparse as usize].as_mut() {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = None;
        self.free_indices.push((id.index, id.generation));
        self.input.forget(id);
        drop(removed);
        true
    }

    /// Mark `id` as needing recomputation.
    ///
    /// No-op if the node already carries every flag in `flags`. Otherwise the
    /// flags are added and, for geometry with `propagate` set, the parent is
    /// invalidated too (and so on up the chain). Colour never propagates.
    /// Returns whether anything changed.
    pub fn invalidate(&mut self, id: NodeId, flags: Invalidation, propagate: bool) -> bool {
        let Some(node) = self.slot_mut(id) else {
            return false;
        };
        if node.invalidation.contains(flags) {
            return false;
        }
        node.invalidation |= flags;

        if propagate && flags.contains(Invalidation::DRAW_INFO) {
            let mut current = node.parent;
            while let Some(parent) = current {
                let Some(node) = self.slot_mut(parent) else {
                    break;
                };
                // Already dirty: so is everything above it.
                if node.invalidation.contains(Invalidation::DRAW_INFO) {
                    break;
                }
                node.invalidation |= Invalidation::DRAW_INFO;
                current = node.parent;
            }
        }
        true
    }

    /// Mark the parent's cached draw order stale after a child's depth changed.
    pub(crate) fn depth_changed(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(children) = self.slot_mut(parent).and_then(|node| node.children.as_mut()) {
            children.order_dirty = true;
        }
        self.invalidate(parent, Invalidation::DRAW_INFO, true);
    }

    /// Children of `id` in draw order: depth descending, ties in insertion
    /// order. Input order is the reverse.
    pub fn draw_order(&self, id: NodeId) -> Vec<NodeId> {
        let Some(children) = self.slot(id).and_then(|node| node.children.as_ref()) else {
            return Vec::new();
        };
        if !children.order_dirty {
            return children.draw_order.clone();
        }
        self.sorted_by_depth(&children.list)
    }

    fn sorted_by_depth(&self, list: &[NodeId]) -> Vec<NodeId> {
        let mut keyed: Vec<(NodeId, f32)> = list
            .iter()
            .filter_map(|&child| self.slot(child).map(|node| (child, node.props.depth)))
            .collect();
        keyed.sort_by(|a, b| b.1.total_cmp(&a.1));
        keyed.into_iter().map(|(child, _)| child).collect()
    }

    /// Refresh the cached draw order of `id` if a child was added, removed or
    /// changed depth since it was last sorted.
    pub(crate) fn ensure_draw_order(&mut self, id: NodeId) {
        let list = match self.slot(id).and_then(|node| node.children.as_ref()) {
            Some(children) if children.order_dirty => children.list.clone(),
            _ => return,
        };
        let order = self.sorted_by_depth(&list);
        if let Some(children) = self.slot_mut(id).and_then(|node| node.children.as_mut()) {
            children.draw_order = order;
            children.order_dirty = false;
        }
    }

    /// Run `f` with the node's behavior taken out, so it can borrow the tree.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Behavior, &mut Tree) -> R,
    ) -> Option<R> {
        let mut behavior = self.slot_mut(id)?.behavior.take()?;
        let result = f(behavior.as_mut(), self);
        if let Some(node) = self.slot_mut(id) {
            if node.behavior.is_none() {
                node.behavior = Some(behavior);
            }
        }
        Some(result)
    }

    /// Current time of the clock that feeds `id`: its parent's clock, or the
    /// source clock for the root and detached nodes.
    fn parent_time(&self, id: NodeId) -> f64 {
        self.parent(id)
            .and_then(|parent| self.slot(parent))
            .and_then(|node| node.clock.as_ref())
            .map(|clock| clock.current_time())
            .unwrap_or_else(|| self.source.current_time())
    }

    /// Dependencies as seen by the children of `id`: the tree's own services
    /// plus whatever `id` and its ancestors provide.
    fn dependencies_below(&self, id: NodeId) -> Dependencies {
        let mut chain: Vec<NodeId> = self.ancestors(id).collect();
        chain.reverse();
        chain.push(id);

        let mut dependencies = self.dependencies.clone();
        for ancestor in chain {
            if let Some(behavior) = self.slot(ancestor).and_then(|node| node.behavior.as_ref()) {
                dependencies.push_scope();
                behavior.provide(&mut dependencies);
            }
        }
        dependencies
    }

    /// Load `id` and every not-yet-loaded node below it.
    ///
    /// An already-loaded node being re-attached keeps its clock, rebased onto
    /// the new parent's time so the move does not register as elapsed time.
    pub(crate) fn load_subtree(&mut self, id: NodeId) {
        let parent_time = self.parent_time(id);
        let fps_window = self.config.fps_window_ms;

        let Some(node) = self.slot_mut(id) else {
            return;
        };
        if node.loaded {
            if let Some(clock) = node.clock.as_mut() {
                clock.rebase(parent_time);
            }
            return;
        }

        let mut clock = FramedClock::new(parent_time).with_fps_window(fps_window);
        clock.set_rate(node.clock_rate);
        if !node.clock_running {
            clock.stop();
        }
        node.clock = Some(clock);
        node.scheduler.set_clock_time(parent_time);
        for transform in &mut node.transforms {
            transform.shift(parent_time);
        }
        node.loaded = true;
        node.invalidation = Invalidation::ALL;
        debug!("loaded {} at t={:.3}", self.describe(id), parent_time);

        let dependencies = match self.parent(id) {
            Some(parent) => self.dependencies_below(parent),
            None => self.dependencies.clone(),
        };
        self.with_behavior(id, |behavior, tree| behavior.load(tree, id, &dependencies));

        for child in self.children(id).to_vec() {
            if self.parent(child) == Some(id) {
                self.load_subtree(child);
            }
        }
    }

    /// Services available to every node at load time.
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub fn dependencies_mut(&mut self) -> &mut Dependencies {
        &mut self.dependencies
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Resize the root's parent space.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.config.viewport = crate::geometry::Vector2::new(width, height);
        if let Some(root) = self.root {
            self.invalidate(root, Invalidation::DRAW_INFO, false);
        }
    }

    /// Current time of the source clock.
    pub fn source_time(&self) -> f64 {
        self.source.current_time()
    }

    /// Replace the source clock. Node clocks are rebased so the switch does
    /// not show up as elapsed time.
    pub fn set_source(&mut self, source: impl Clock + 'static) {
        self.source = Box::new(source);
        let time = self.source.current_time();
        if let Some(clock) = self
            .root
            .and_then(|root| self.slot_mut(root))
            .and_then(|node| node.clock.as_mut())
        {
            clock.rebase(time);
        }
    }

    /// Counters of the last completed [`update`](Tree::update).
    pub fn stats(&self) -> &FrameStats {
        &self.frame_stats
    }

    /// Counters summed over every update so far.
    pub fn total_stats(&self) -> &FrameStats {
        &self.total_stats
    }

    /// Short human-readable name of a node for log lines.
    pub(crate) fn describe(&self, id: NodeId) -> String {
        match self.slot(id).and_then(|node| node.props.label.as_deref()) {
            Some(label) => format!("{:?} \"{}\"", id, label),
            None => format!("{:?}", id),
        }
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
