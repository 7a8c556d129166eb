//! Time-driven property animation.
//!
//! A [`Transform`] tweens one property of one node between a start and end
//! time on that node's clock. Transforms are queued on the node (directly via
//! [`NodeMut::add_transform`](crate::node::NodeMut::add_transform) or through
//! the fluent helpers in [`builder`]) and applied during the frame update,
//! before geometry is recomputed.
//!
//! ## Example
//!
//! ```ignore
//! tree.node_mut(id)
//!     .unwrap()
//!     .fade_in(200.0, Easing::OutQuad)
//!     .delay(200.0)
//!     .move_to((100.0, 0.0), 300.0, Easing::OutBack);
//! ```

pub mod builder;
mod interpolate;
mod transform;

pub use interpolate::Interpolate;
pub use transform::{PropertyValue, Transform, TransformState, TransformTarget, Tween};
