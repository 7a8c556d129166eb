//! Draw info computation: from a node's properties and its parent's content
//! space to its final size, matrix and screen rectangle.
//!
//! All math runs in pixels. For each axis the parent's content size `P` (its
//! draw size minus padding, never zero) resolves relative values:
//!
//! ```text
//! draw_size = relative_size ? size * P : size
//! anchor_px = anchor * P + (relative_position ? position * P : position)
//!           + (margin.left - margin.right, margin.top - margin.bottom)
//! origin_px = origin * draw_size
//!
//! local  = translate(anchor_px) * rotate * scale * translate(-origin_px)
//! matrix = parent_content * local            (node pixels -> screen)
//! model  = matrix * scale(draw_size)         (unit quad   -> screen)
//! ```
//!
//! Because the origin is removed before scaling and rotating, neither moves
//! the point pinned to the anchor.

use log::warn;

use crate::geometry::{Rect, Vector2};
use crate::matrix::Matrix;
use crate::node::Properties;

/// Derived geometry of a node, recomputed only when the node is invalidated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInfo {
    /// Final pixel size, before scale and rotation.
    pub draw_size: Vector2,
    /// Content area offered to children.
    pub child_size: Vector2,
    /// Maps the unit quad `[0,1]²` to screen space.
    pub model_matrix: Matrix,
    /// Maps the content box (pixels, origin at its top-left) to screen space.
    pub content_matrix: Matrix,
    /// Axis-aligned bounds of the transformed unit quad.
    pub rect: Rect,
    pub draw_alpha: f32,
    /// Intersection of the rectangles of all masking ancestors.
    pub clip: Option<Rect>,
}

impl Default for DrawInfo {
    fn default() -> Self {
        Self {
            draw_size: Vector2::ZERO,
            child_size: Vector2::ZERO,
            model_matrix: Matrix::IDENTITY,
            content_matrix: Matrix::IDENTITY,
            rect: Rect::default(),
            draw_alpha: 1.0,
            clip: None,
        }
    }
}

/// The coordinate space a parent offers its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentSpace {
    pub child_size: Vector2,
    pub content_matrix: Matrix,
    pub draw_alpha: f32,
    pub clip: Option<Rect>,
}

impl ParentSpace {
    /// Space of the root node: the whole viewport, unclipped.
    pub fn viewport(size: Vector2) -> Self {
        Self {
            child_size: size,
            content_matrix: Matrix::IDENTITY,
            draw_alpha: 1.0,
            clip: None,
        }
    }

    /// Space a computed node offers its own children.
    pub fn of(info: &DrawInfo, masking: bool) -> Self {
        let clip = if masking {
            Some(match info.clip {
                Some(outer) => outer.intersection(&info.rect),
                None => info.rect,
            })
        } else {
            info.clip
        };
        Self {
            child_size: info.child_size,
            content_matrix: info.content_matrix,
            draw_alpha: info.draw_alpha,
            clip,
        }
    }
}

/// Compute a node's draw info in `parent` space.
pub fn compute(props: &Properties, parent: &ParentSpace) -> DrawInfo {
    let relative_axes = props.relative_size_axes | props.relative_position_axes;
    if !relative_axes.is_empty() && (parent.child_size.x == 0.0 || parent.child_size.y == 0.0) {
        warn!(
            "{}: parent content area {:?} is degenerate, substituting 1 on zero axes",
            props.label.as_deref().unwrap_or("node"),
            parent.child_size
        );
    }
    let p = parent.child_size.non_zero();

    let draw_size = props.relative_size_axes.apply(props.size, p);
    let margin = &props.margin;
    let anchor_px = props.anchor.vector().scale(p)
        + props.relative_position_axes.apply(props.position, p)
        + Vector2::new(margin.left - margin.right, margin.top - margin.bottom);
    let origin_px = props.origin.vector().scale(draw_size);

    let local = Matrix::translation(anchor_px)
        .rotated_degrees(props.rotation)
        .scaled(props.scale)
        .translated(-origin_px);
    let node_matrix = parent.content_matrix.then(&local);
    let model_matrix = node_matrix.scaled(draw_size);

    let padding = props.padding.scaled(props.relative_padding_axes, draw_size);
    let child_size = (draw_size - padding.total()).max(Vector2::ZERO);
    let content_matrix = node_matrix.translated(padding.top_left());

    DrawInfo {
        draw_size,
        child_size,
        model_matrix,
        content_matrix,
        rect: model_matrix.unit_quad_bounds(),
        draw_alpha: parent.draw_alpha * props.alpha,
        clip: parent.clip,
    }
}
