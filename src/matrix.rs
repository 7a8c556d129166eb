use crate::geometry::{Rect, Vector2};

/// A 4x4 affine matrix stored in row-major order.
///
/// Only the 2D part (rotation/scale in the upper-left 2x2, translation in
/// column 3) is ever populated by layout, but the full 4x4 layout is kept so
/// renderers can upload [`Matrix::rows`] as-is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix {
    pub data: [f32; 16],
}

impl Matrix {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, 0.0, // row 1
            0.0, 0.0, 1.0, 0.0, // row 2
            0.0, 0.0, 0.0, 1.0, // row 3
        ],
    };

    fn affine(a: f32, b: f32, tx: f32, c: f32, d: f32, ty: f32) -> Self {
        Self {
            data: [
                a, b, 0.0, tx, // row 0
                c, d, 0.0, ty, // row 1
                0.0, 0.0, 1.0, 0.0, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    pub fn translation(offset: Vector2) -> Self {
        Self::affine(1.0, 0.0, offset.x, 0.0, 1.0, offset.y)
    }

    pub fn scaling(factor: Vector2) -> Self {
        Self::affine(factor.x, 0.0, 0.0, 0.0, factor.y, 0.0)
    }

    /// Clockwise rotation in screen space (y pointing down).
    pub fn rotation_degrees(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::affine(cos, -sin, 0.0, sin, cos, 0.0)
    }

    /// `self * other`: applies `other` first, then `self`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        let a = &self.data;
        let b = &other.data;
        let mut result = [0.0f32; 16];

        for i in 0..4 {
            for j in 0..4 {
                result[i * 4 + j] = (0..4).map(|k| a[i * 4 + k] * b[k * 4 + j]).sum();
            }
        }

        Matrix { data: result }
    }

    pub fn translated(&self, offset: Vector2) -> Matrix {
        self.then(&Matrix::translation(offset))
    }

    pub fn scaled(&self, factor: Vector2) -> Matrix {
        self.then(&Matrix::scaling(factor))
    }

    pub fn rotated_degrees(&self, degrees: f32) -> Matrix {
        if degrees == 0.0 {
            return *self;
        }
        self.then(&Matrix::rotation_degrees(degrees))
    }

    /// Inverse of the 2D affine part; identity if the matrix is degenerate.
    pub fn inverse(&self) -> Matrix {
        let a = self.data[0];
        let b = self.data[1];
        let c = self.data[4];
        let d = self.data[5];
        let tx = self.data[3];
        let ty = self.data[7];

        let det = a * d - b * c;
        if det.abs() < 1e-10 {
            return Self::IDENTITY;
        }
        let inv_det = 1.0 / det;

        Self::affine(
            d * inv_det,
            -b * inv_det,
            (-d * tx + b * ty) * inv_det,
            -c * inv_det,
            a * inv_det,
            (c * tx - a * ty) * inv_det,
        )
    }

    pub fn transform_point(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            self.data[0] * p.x + self.data[1] * p.y + self.data[3],
            self.data[4] * p.x + self.data[5] * p.y + self.data[7],
        )
    }

    /// The four corners of the unit quad mapped through this matrix, in
    /// top-left, top-right, bottom-left, bottom-right order.
    pub fn unit_quad(&self) -> [Vector2; 4] {
        [
            self.transform_point(Vector2::new(0.0, 0.0)),
            self.transform_point(Vector2::new(1.0, 0.0)),
            self.transform_point(Vector2::new(0.0, 1.0)),
            self.transform_point(Vector2::new(1.0, 1.0)),
        ]
    }

    /// Axis-aligned bounds of the transformed unit quad.
    pub fn unit_quad_bounds(&self) -> Rect {
        Rect::bounding(&self.unit_quad())
    }

    pub fn rows(&self) -> [[f32; 4]; 4] {
        [
            [self.data[0], self.data[1], self.data[2], self.data[3]],
            [self.data[4], self.data[5], self.data[6], self.data[7]],
            [self.data[8], self.data[9], self.data[10], self.data[11]],
            [self.data[12], self.data[13], self.data[14], self.data[15]],
        ]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
