use bitflags::bitflags;

use crate::color::Color;
use crate::geometry::{Anchor, Axes, MarginPadding, Vector2};

bitflags! {
    /// What about a node needs recomputing on its next update.
    ///
    /// An empty set means the node is clean and its draw info is reused.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Invalidation: u8 {
        /// Geometry: size, position, anchors, scale, rotation, insets.
        const DRAW_INFO = 0b01;
        /// Alpha or colour.
        const COLOUR    = 0b10;
        const ALL = Self::DRAW_INFO.bits() | Self::COLOUR.bits();
    }
}

/// Tolerance-aware equality used to decide whether an assignment is a real
/// change.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self == other || (self - other).abs() <= epsilon
    }
}

impl ApproxEq for Vector2 {
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.approx_eq(&other.x, epsilon) && self.y.approx_eq(&other.y, epsilon)
    }
}

impl ApproxEq for Color {
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.r.approx_eq(&other.r, epsilon)
            && self.g.approx_eq(&other.g, epsilon)
            && self.b.approx_eq(&other.b, epsilon)
            && self.a.approx_eq(&other.a, epsilon)
    }
}

impl ApproxEq for MarginPadding {
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.top.approx_eq(&other.top, epsilon)
            && self.right.approx_eq(&other.right, epsilon)
            && self.bottom.approx_eq(&other.bottom, epsilon)
            && self.left.approx_eq(&other.left, epsilon)
    }
}

macro_rules! exact_approx_eq {
    ($($ty:ty),*) => {
        $(impl ApproxEq for $ty {
            fn approx_eq(&self, other: &Self, _epsilon: f32) -> bool {
                self == other
            }
        })*
    };
}

exact_approx_eq!(Anchor, Axes, bool);

/// Whether replacing `current` with `new` is a change worth invalidating for.
///
/// NaN never compares equal, so assigning NaN always counts as a change.
pub fn changed<T: ApproxEq>(current: &T, new: &T, epsilon: f32) -> bool {
    !current.approx_eq(new, epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_respects_epsilon() {
        assert!(!changed(&1.0f32, &1.00001, 1e-4));
        assert!(changed(&1.0f32, &1.001, 1e-4));
        assert!(!changed(&Vector2::new(5.0, 5.0), &Vector2::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_exact_types() {
        assert!(changed(&Anchor::Centre, &Anchor::TopLeft, 1.0));
        assert!(!changed(&Axes::BOTH, &(Axes::X | Axes::Y), 0.0));
    }

    #[test]
    fn test_nan_always_changes() {
        assert!(changed(&f32::NAN, &f32::NAN, 1.0));
    }

    #[test]
    fn test_flags_superset() {
        assert!(Invalidation::ALL.contains(Invalidation::COLOUR));
        assert!(!Invalidation::COLOUR.contains(Invalidation::ALL));
        assert!(Invalidation::empty().is_empty());
    }
}
