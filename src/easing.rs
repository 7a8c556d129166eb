//! Easing curves for transforms.
//!
//! An easing maps linear progress `t` in `[0, 1]` to an eased progress. Most
//! curves return exactly `0` at `t = 0` and `1` at `t = 1`; elastic and back
//! curves overshoot in between.
//!
//! ## Families
//!
//! - [`Easing::None`] - linear
//! - [`Easing::In`] / [`Easing::Out`] / [`Easing::InOut`] - quadratic shorthands
//! - polynomial (`Quad` .. `Quint`), `Sine`, `Expo`, `Circ`
//! - `Elastic`, `Back`, `Bounce` - overshooting or rebounding curves
//! - [`Easing::CubicBezier`] - CSS-style control points
//! - [`Easing::Custom`] - any function

use std::f64::consts::PI;
use std::sync::Arc;

const ELASTIC_PERIOD: f64 = 0.3;
const BACK_OVERSHOOT: f64 = 1.70158;
const BACK_OVERSHOOT_IN_OUT: f64 = BACK_OVERSHOOT * 1.525;
const BOUNCE_DIVISOR: f64 = 2.75;
const BOUNCE_FACTOR: f64 = 7.5625;

#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    None,
    In,
    Out,
    InOut,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InSine,
    OutSine,
    InOutSine,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InElastic,
    OutElastic,
    OutElasticHalf,
    OutElasticQuarter,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
    OutPow10,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Easing {
    /// Eased progress at linear progress `t`.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::None => t,
            Easing::In | Easing::InQuad => t * t,
            Easing::Out | Easing::OutQuad => t * (2.0 - t),
            Easing::InOut | Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::InCubic => t.powi(3),
            Easing::OutCubic => (t - 1.0).powi(3) + 1.0,
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    4.0 * (t - 1.0).powi(3) + 1.0
                }
            }
            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (t - 1.0).powi(4),
            Easing::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - 8.0 * (t - 1.0).powi(4)
                }
            }
            Easing::InQuint => t.powi(5),
            Easing::OutQuint => (t - 1.0).powi(5) + 1.0,
            Easing::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    16.0 * (t - 1.0).powi(5) + 1.0
                }
            }
            Easing::InSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::OutSine => (t * PI / 2.0).sin(),
            Easing::InOutSine => 0.5 - 0.5 * (PI * t).cos(),
            Easing::InExpo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * (t - 1.0))
                }
            }
            Easing::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::InOutExpo => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    0.5 * 2f64.powf(20.0 * t - 10.0)
                } else {
                    1.0 - 0.5 * 2f64.powf(-20.0 * t + 10.0)
                }
            }
            Easing::InCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Easing::InOutCirc => {
                let t2 = t * 2.0;
                if t2 < 1.0 {
                    0.5 - 0.5 * (1.0 - t2 * t2).max(0.0).sqrt()
                } else {
                    let u = t2 - 2.0;
                    0.5 * (1.0 - u * u).max(0.0).sqrt() + 0.5
                }
            }
            Easing::InElastic => in_elastic(t),
            Easing::OutElastic => out_elastic(t, 1.0),
            Easing::OutElasticHalf => out_elastic(t, 0.5),
            Easing::OutElasticQuarter => out_elastic(t, 0.25),
            Easing::InOutElastic => {
                if t < 0.5 {
                    0.5 * in_elastic(2.0 * t)
                } else {
                    0.5 * out_elastic(2.0 * t - 1.0, 1.0) + 0.5
                }
            }
            Easing::InBack => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Easing::OutBack => {
                let u = t - 1.0;
                u * u * ((BACK_OVERSHOOT + 1.0) * u + BACK_OVERSHOOT) + 1.0
            }
            Easing::InOutBack => {
                let t2 = t * 2.0;
                let s = BACK_OVERSHOOT_IN_OUT;
                if t2 < 1.0 {
                    0.5 * (t2 * t2 * ((s + 1.0) * t2 - s))
                } else {
                    let u = t2 - 2.0;
                    0.5 * (u * u * ((s + 1.0) * u + s) + 2.0)
                }
            }
            Easing::InBounce => 1.0 - out_bounce(1.0 - t),
            Easing::OutBounce => out_bounce(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    0.5 - 0.5 * out_bounce(1.0 - 2.0 * t)
                } else {
                    0.5 * out_bounce(2.0 * t - 1.0) + 0.5
                }
            }
            Easing::OutPow10 => (t - 1.0).powi(11) + 1.0,
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(
                t,
                f64::from(*x1),
                f64::from(*y1),
                f64::from(*x2),
                f64::from(*y2),
            ),
            Easing::Custom(f) => f(t),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Custom(_) => write!(f, "Custom"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl Easing {
    fn name(&self) -> &'static str {
        match self {
            Easing::None => "None",
            Easing::In => "In",
            Easing::Out => "Out",
            Easing::InOut => "InOut",
            Easing::InQuad => "InQuad",
            Easing::OutQuad => "OutQuad",
            Easing::InOutQuad => "InOutQuad",
            Easing::InCubic => "InCubic",
            Easing::OutCubic => "OutCubic",
            Easing::InOutCubic => "InOutCubic",
            Easing::InQuart => "InQuart",
            Easing::OutQuart => "OutQuart",
            Easing::InOutQuart => "InOutQuart",
            Easing::InQuint => "InQuint",
            Easing::OutQuint => "OutQuint",
            Easing::InOutQuint => "InOutQuint",
            Easing::InSine => "InSine",
            Easing::OutSine => "OutSine",
            Easing::InOutSine => "InOutSine",
            Easing::InExpo => "InExpo",
            Easing::OutExpo => "OutExpo",
            Easing::InOutExpo => "InOutExpo",
            Easing::InCirc => "InCirc",
            Easing::OutCirc => "OutCirc",
            Easing::InOutCirc => "InOutCirc",
            Easing::InElastic => "InElastic",
            Easing::OutElastic => "OutElastic",
            Easing::OutElasticHalf => "OutElasticHalf",
            Easing::OutElasticQuarter => "OutElasticQuarter",
            Easing::InOutElastic => "InOutElastic",
            Easing::InBack => "InBack",
            Easing::OutBack => "OutBack",
            Easing::InOutBack => "InOutBack",
            Easing::InBounce => "InBounce",
            Easing::OutBounce => "OutBounce",
            Easing::InOutBounce => "InOutBounce",
            Easing::OutPow10 => "OutPow10",
            Easing::CubicBezier(..) => "CubicBezier",
            Easing::Custom(_) => "Custom",
        }
    }
}

fn in_elastic(t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let u = t - 1.0;
    -(2f64.powf(10.0 * u)) * ((u - ELASTIC_PERIOD / 4.0) * (2.0 * PI) / ELASTIC_PERIOD).sin()
}

/// `cycles` compresses the oscillation: 1.0 is the full curve, 0.5 and 0.25
/// only play the first half/quarter of it.
fn out_elastic(t: f64, cycles: f64) -> f64 {
    if t >= 1.0 && cycles == 1.0 {
        return 1.0;
    }
    2f64.powf(-10.0 * t) * ((cycles * t - ELASTIC_PERIOD / 4.0) * (2.0 * PI) / ELASTIC_PERIOD).sin()
        + 1.0
}

fn out_bounce(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_DIVISOR {
        BOUNCE_FACTOR * t * t
    } else if t < 2.0 / BOUNCE_DIVISOR {
        let u = t - 1.5 / BOUNCE_DIVISOR;
        BOUNCE_FACTOR * u * u + 0.75
    } else if t < 2.5 / BOUNCE_DIVISOR {
        let u = t - 2.25 / BOUNCE_DIVISOR;
        BOUNCE_FACTOR * u * u + 0.9375
    } else {
        let u = t - 2.625 / BOUNCE_DIVISOR;
        BOUNCE_FACTOR * u * u + 0.984375
    }
}

/// Solves x(s) = t with Newton-Raphson, then evaluates y(s).
/// Assumes x1 and x2 lie in [0, 1].
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let mut s = t;
    for _ in 0..8 {
        let x = bezier_component(s, x1, x2) - t;
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= x / slope;
    }
    bezier_component(s, y1, y2)
}

fn bezier_component(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT_EXACT: [Easing; 13] = [
        Easing::None,
        Easing::In,
        Easing::Out,
        Easing::InOut,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutQuart,
        Easing::OutQuint,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::OutElastic,
        Easing::OutBounce,
        Easing::OutPow10,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ENDPOINT_EXACT.iter() {
            assert!(easing.apply(0.0).abs() < 1e-3, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-3, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_in_is_slow_out_is_fast() {
        assert!(Easing::In.apply(0.5) < 0.5);
        assert!(Easing::Out.apply(0.5) > 0.5);
        assert_eq!(Easing::InOut.apply(0.5), 0.5);
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::InBack.apply(0.2) < 0.0);
        assert!(Easing::OutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_bounce_stays_in_range() {
        for i in 0..=100 {
            let v = Easing::OutBounce.apply(i as f64 / 100.0);
            assert!((0.0..=1.0 + 1e-9).contains(&v));
        }
    }

    #[test]
    fn test_linear_bezier_matches_linear() {
        let linear = Easing::CubicBezier(0.0, 0.0, 1.0, 1.0);
        for t in [0.1, 0.25, 0.5, 0.9] {
            assert!((linear.apply(t) - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_custom() {
        let step = Easing::custom(|t| if t < 0.5 { 0.0 } else { 1.0 });
        assert_eq!(step.apply(0.4), 0.0);
        assert_eq!(step.apply(0.6), 1.0);
        assert_eq!(format!("{:?}", step), "Custom");
    }
}
