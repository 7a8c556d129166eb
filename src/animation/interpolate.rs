/// Types that can be animated by interpolating between two values.
///
/// `t = 0.0` returns `from`, `t = 1.0` returns `to`. Eased progress may leave
/// the `[0, 1]` range (back and elastic curves), so implementations must
/// extrapolate rather than clamp.
///
/// Structs whose fields are all `Interpolate` can use
/// `#[derive(Interpolate)]`.
pub trait Interpolate: Clone {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for f64 {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * f64::from(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{MarginPadding, Vector2};

    #[test]
    fn test_f32_interpolate() {
        assert_eq!(f32::interpolate(&0.0, &10.0, 0.0), 0.0);
        assert_eq!(f32::interpolate(&0.0, &10.0, 0.5), 5.0);
        assert_eq!(f32::interpolate(&0.0, &10.0, 1.0), 10.0);
        // Overshoot
        assert_eq!(f32::interpolate(&0.0, &10.0, 1.5), 15.0);
    }

    #[test]
    fn test_derived_vector_interpolate() {
        let mid = Vector2::interpolate(&Vector2::ZERO, &Vector2::new(10.0, -4.0), 0.25);
        assert_eq!(mid, Vector2::new(2.5, -1.0));
    }

    #[test]
    fn test_derived_insets_interpolate() {
        let mid = MarginPadding::interpolate(&MarginPadding::ZERO, &MarginPadding::all(10.0), 0.5);
        assert_eq!(mid, MarginPadding::all(5.0));
    }
}
