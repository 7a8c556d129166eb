//! Plain geometric value types shared by layout, input and drawing.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use bitflags::bitflags;
use canopy_macros::Interpolate;

/// A 2D vector in pixels or normalized units, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Interpolate)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);
    pub const ONE: Vector2 = Vector2::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Component-wise product.
    pub fn scale(self, other: Vector2) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise quotient.
    pub fn div(self, other: Vector2) -> Self {
        Self::new(self.x / other.x, self.y / other.y)
    }

    pub fn min(self, other: Vector2) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vector2) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Replace zero components with 1, keeping divisions by this vector finite.
    pub fn non_zero(self) -> Self {
        Self::new(
            if self.x == 0.0 { 1.0 } else { self.x },
            if self.y == 0.0 { 1.0 } else { self.y },
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from((x, y): (f32, f32)) -> Self {
        Vector2::new(x, y)
    }
}

impl From<f32> for Vector2 {
    fn from(v: f32) -> Self {
        Vector2::splat(v)
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Vector2) -> Self {
        Self::new(0.0, 0.0, size.x, size.y)
    }

    /// Smallest rectangle containing every point.
    pub fn bounding(points: &[Vector2]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .skip(1)
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn centre(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlapping area of two rectangles; empty (zero-sized) when disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect::new(x, y, (right - x).max(0.0), (bottom - y).max(0.0))
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Four-sided insets, used for both margin and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Interpolate)]
pub struct MarginPadding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl MarginPadding {
    pub const ZERO: MarginPadding = MarginPadding {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Sum of opposing sides per axis.
    pub fn total(&self) -> Vector2 {
        Vector2::new(self.horizontal(), self.vertical())
    }

    pub fn top_left(&self) -> Vector2 {
        Vector2::new(self.left, self.top)
    }

    /// Scale the sides along the given axes, leaving the other axis untouched.
    pub fn scaled(&self, axes: Axes, by: Vector2) -> Self {
        let sx = if axes.contains(Axes::X) { by.x } else { 1.0 };
        let sy = if axes.contains(Axes::Y) { by.y } else { 1.0 };
        Self {
            top: self.top * sy,
            right: self.right * sx,
            bottom: self.bottom * sy,
            left: self.left * sx,
        }
    }
}

impl From<f32> for MarginPadding {
    fn from(v: f32) -> Self {
        MarginPadding::all(v)
    }
}

/// `[vertical, horizontal]` shorthand.
impl From<[f32; 2]> for MarginPadding {
    fn from(v: [f32; 2]) -> Self {
        MarginPadding::symmetric(v[1], v[0])
    }
}

/// `[top, right, bottom, left]` shorthand.
impl From<[f32; 4]> for MarginPadding {
    fn from(v: [f32; 4]) -> Self {
        MarginPadding {
            top: v[0],
            right: v[1],
            bottom: v[2],
            left: v[3],
        }
    }
}

bitflags! {
    /// Axes along which a property is relative to the parent instead of absolute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
    pub struct Axes: u8 {
        const X = 0b01;
        const Y = 0b10;
        const BOTH = Self::X.bits() | Self::Y.bits();
    }
}

impl Axes {
    /// Apply these relative axes: relative components are multiplied by `parent`,
    /// absolute ones pass through.
    pub fn apply(self, value: Vector2, parent: Vector2) -> Vector2 {
        Vector2::new(
            if self.contains(Axes::X) { value.x * parent.x } else { value.x },
            if self.contains(Axes::Y) { value.y * parent.y } else { value.y },
        )
    }
}

/// One of the nine normalized reference points of a rectangle.
///
/// Used both as an anchor (point within the parent) and an origin
/// (point within the node itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCentre,
        Anchor::TopRight,
        Anchor::CentreLeft,
        Anchor::Centre,
        Anchor::CentreRight,
        Anchor::BottomLeft,
        Anchor::BottomCentre,
        Anchor::BottomRight,
    ];

    /// Normalized position of this point, (0,0) top-left to (1,1) bottom-right.
    pub fn vector(self) -> Vector2 {
        match self {
            Anchor::TopLeft => Vector2::new(0.0, 0.0),
            Anchor::TopCentre => Vector2::new(0.5, 0.0),
            Anchor::TopRight => Vector2::new(1.0, 0.0),
            Anchor::CentreLeft => Vector2::new(0.0, 0.5),
            Anchor::Centre => Vector2::new(0.5, 0.5),
            Anchor::CentreRight => Vector2::new(1.0, 0.5),
            Anchor::BottomLeft => Vector2::new(0.0, 1.0),
            Anchor::BottomCentre => Vector2::new(0.5, 1.0),
            Anchor::BottomRight => Vector2::new(1.0, 1.0),
        }
    }
}
