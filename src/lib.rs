//! A retained-mode scene graph core.
//!
//! `canopy` owns a tree of positioned, sized and styled nodes. Each node
//! lazily computes its screen-space transform from an anchor/origin/relative
//! sizing model, tracks what changed with per-node invalidation flags, runs
//! time-bounded tweens ("transforms") and delayed callbacks against its own
//! framed clock, and is traversed once per frame for update, hit-testing and
//! drawing.
//!
//! ## Frame loop
//!
//! ```text
//!   source Clock ──► Tree::update()
//!                       │  per node, parent before children:
//!                       │    FramedClock::process_frame
//!                       │    Scheduler (due tasks)
//!                       │    Transforms (tweens)
//!                       │    Behavior::update
//!                       │    layout::compute (only if invalidated)
//!                       ▼
//!   Tree::dispatch(event)      Tree::collect_draw() ──► renderer
//! ```
//!
//! Rendering, text, audio and windowing are left to the host; the tree hands
//! over [`draw::DrawCommand`]s and consumes already-normalized
//! [`input::Event`]s.

// Lets `#[derive(Interpolate)]` refer to `::canopy` from inside this crate.
extern crate self as canopy;

pub mod animation;
pub mod behavior;
pub mod clock;
pub mod color;
pub mod dependencies;
pub mod draw;
pub mod easing;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod invalidation;
pub mod layout;
pub mod matrix;
pub mod node;
pub mod scheduler;
pub mod stats;
pub mod tree;

pub use canopy_macros::Interpolate;
pub use error::{Error, Result};

use geometry::Vector2;

pub mod prelude {
    pub use crate::animation::{Interpolate, Transform, TransformTarget, Tween};
    pub use crate::behavior::Behavior;
    pub use crate::clock::{Clock, FrameClock, FramedClock, ManualClock, StopwatchClock};
    pub use crate::color::Color;
    pub use crate::dependencies::Dependencies;
    pub use crate::draw::{DrawCommand, TextureId, Vertex};
    pub use crate::easing::Easing;
    pub use crate::geometry::{Anchor, Axes, MarginPadding, Rect, Vector2};
    pub use crate::input::{Event, EventResponse, Key, Modifiers, MouseButton};
    pub use crate::invalidation::Invalidation;
    pub use crate::node::{container, drawable, Drawable, NodeMut, NodeRef};
    pub use crate::scheduler::TaskId;
    pub use crate::tree::{NodeId, Tree};
    pub use crate::{Error, Result, TreeConfig};
    pub use canopy_macros::Interpolate;
}

/// Process-level knobs for a [`tree::Tree`].
#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    /// Parent space of the root node: its anchor, relative size and relative
    /// position are resolved against this size.
    pub viewport: Vector2,
    /// Float tolerance below which a property assignment does not invalidate.
    pub epsilon: f32,
    /// Window over which framed clocks estimate frames per second.
    pub fps_window_ms: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            viewport: Vector2::new(1920.0, 1080.0),
            epsilon: 1e-4,
            fps_window_ms: 1000.0,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Vector2::new(width, height);
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn fps_window_ms(mut self, window: f64) -> Self {
        self.fps_window_ms = window;
        self
    }
}
