//! The drawing contract handed to a renderer.
//!
//! [`Tree::collect_draw`] walks the attached tree in draw order and emits one
//! [`DrawCommand`] per visible node: a screen-space quad with its colour
//! (already multiplied by the inherited alpha), optional texture and the clip
//! rectangle of its masking ancestors. The vertex layout is plain `#[repr(C)]`
//! data that can be copied into a GPU buffer as-is.

use log::trace;

use crate::color::Color;
use crate::geometry::Rect;
use crate::matrix::Matrix;
use crate::tree::{NodeId, Tree};

/// Opaque handle to a texture owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Vertex of a node quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in screen pixels
    pub position: [f32; 2],
    /// Texture coordinates
    pub tex_coords: [f32; 2],
    /// Straight RGBA, alpha already multiplied by the draw alpha
    pub color: [f32; 4],
}

/// Index buffer for a quad
pub const QUAD_INDICES: [u16; 6] = [
    0, 1, 2, // first triangle: top-left, top-right, bottom-left
    1, 3, 2, // second triangle: top-right, bottom-right, bottom-left
];

const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub node: NodeId,
    /// Axis-aligned bounds of the quad.
    pub rect: Rect,
    /// Unit quad to screen.
    pub matrix: Matrix,
    pub alpha: f32,
    pub color: Color,
    pub texture: Option<TextureId>,
    pub clip: Option<Rect>,
    pub vertices: [Vertex; 4],
}

impl DrawCommand {
    /// The vertex data as raw bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Tree {
    /// Draw commands for the attached tree: each parent before its children,
    /// children in draw order (deepest first). Reflects the draw info of the
    /// last [`update`](Tree::update).
    ///
    /// Subtrees with zero draw alpha are skipped entirely. A node whose
    /// rectangle lies outside its clip emits nothing, but its children are
    /// still visited.
    pub fn collect_draw(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::new();
        if let Some(root) = self.root {
            self.collect_node(root, &mut commands);
        }
        trace!("collected {} draw commands", commands.len());
        commands
    }

    fn collect_node(&self, id: NodeId, out: &mut Vec<DrawCommand>) {
        let Some(node) = self.slot(id) else {
            return;
        };
        let info = &node.draw_info;
        if !node.loaded || info.draw_alpha <= 0.0 {
            return;
        }

        let clipped_out = info.clip.is_some_and(|clip| !clip.intersects(&info.rect));
        if !clipped_out {
            let color = node.props.color.multiply_alpha(info.draw_alpha);
            let corners = info.model_matrix.unit_quad();
            let vertices = std::array::from_fn(|i| Vertex {
                position: [corners[i].x, corners[i].y],
                tex_coords: QUAD_TEX_COORDS[i],
                color: color.to_array(),
            });
            out.push(DrawCommand {
                node: id,
                rect: info.rect,
                matrix: info.model_matrix,
                alpha: info.draw_alpha,
                color,
                texture: node.props.texture,
                clip: info.clip,
                vertices,
            });
        }

        for child in self.draw_order(id) {
            if self.parent(child) == Some(id) {
                self.collect_node(child, out);
            }
        }
    }
}
