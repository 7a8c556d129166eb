use crate::color::Color;
use crate::easing::Easing;
use crate::geometry::Vector2;
use crate::node::Properties;

use super::Interpolate;

/// Start and end value of one animated property.
///
/// `start` is `None` until the transform first runs, at which point the
/// property's current value is captured. This lets a transform be queued
/// behind another one without knowing where that one will leave the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    pub start: Option<T>,
    pub end: T,
}

impl<T: Interpolate> Tween<T> {
    pub fn to(end: T) -> Self {
        Self { start: None, end }
    }

    /// A tween with a fixed start value, ignoring whatever the property holds.
    pub fn between(start: T, end: T) -> Self {
        Self {
            start: Some(start),
            end,
        }
    }

    fn capture(&mut self, current: T) -> &T {
        self.start.get_or_insert(current)
    }

    fn sample(&mut self, current: T, t: f32) -> T {
        let start = self.capture(current).clone();
        T::interpolate(&start, &self.end, t)
    }
}

/// The property a [`Transform`] drives, with its tween.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformTarget {
    Position(Tween<Vector2>),
    Size(Tween<Vector2>),
    Scale(Tween<Vector2>),
    Alpha(Tween<f32>),
    Colour(Tween<Color>),
    /// Degrees.
    Rotation(Tween<f32>),
}

/// A concrete value for one animatable property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Position(Vector2),
    Size(Vector2),
    Scale(Vector2),
    Alpha(f32),
    Colour(Color),
    Rotation(f32),
}

impl TransformTarget {
    pub fn position(end: impl Into<Vector2>) -> Self {
        Self::Position(Tween::to(end.into()))
    }

    pub fn size(end: impl Into<Vector2>) -> Self {
        Self::Size(Tween::to(end.into()))
    }

    pub fn scale(end: impl Into<Vector2>) -> Self {
        Self::Scale(Tween::to(end.into()))
    }

    pub fn alpha(end: f32) -> Self {
        Self::Alpha(Tween::to(end))
    }

    pub fn colour(end: Color) -> Self {
        Self::Colour(Tween::to(end))
    }

    pub fn rotation(end: f32) -> Self {
        Self::Rotation(Tween::to(end))
    }

    /// Interpolated value at eased progress `t`, capturing the start value
    /// from `props` if this is the first sample.
    pub(crate) fn sample(&mut self, props: &Properties, t: f32) -> PropertyValue {
        match self {
            Self::Position(tween) => PropertyValue::Position(tween.sample(props.position, t)),
            Self::Size(tween) => PropertyValue::Size(tween.sample(props.size, t)),
            Self::Scale(tween) => PropertyValue::Scale(tween.sample(props.scale, t)),
            Self::Alpha(tween) => PropertyValue::Alpha(tween.sample(props.alpha, t)),
            Self::Colour(tween) => PropertyValue::Colour(tween.sample(props.color, t)),
            Self::Rotation(tween) => PropertyValue::Rotation(tween.sample(props.rotation, t)),
        }
    }

    /// The exact target value.
    pub fn end_value(&self) -> PropertyValue {
        match self {
            Self::Position(tween) => PropertyValue::Position(tween.end),
            Self::Size(tween) => PropertyValue::Size(tween.end),
            Self::Scale(tween) => PropertyValue::Scale(tween.end),
            Self::Alpha(tween) => PropertyValue::Alpha(tween.end),
            Self::Colour(tween) => PropertyValue::Colour(tween.end),
            Self::Rotation(tween) => PropertyValue::Rotation(tween.end),
        }
    }
}

/// What happened when a transform was applied for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    /// Start time not reached; nothing was written.
    Pending,
    /// An interpolated value was written.
    Running,
    /// The exact end value was written; the transform is done.
    Finished,
}

/// A time-bounded interpolation of one node property.
///
/// Times are on the owning node's clock. A looping transform repeats its
/// `[start_time, end_time)` window forever and only ends when cleared.
#[derive(Debug, Clone)]
pub struct Transform {
    pub target: TransformTarget,
    pub start_time: f64,
    pub end_time: f64,
    pub easing: Easing,
    pub looping: bool,
}

impl Transform {
    pub fn new(target: TransformTarget, start_time: f64, end_time: f64) -> Self {
        Self {
            target,
            start_time,
            end_time,
            easing: Easing::None,
            looping: false,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Linear progress in `[0, 1]` at `time`.
    ///
    /// Looping transforms wrap with a modulo; others clamp. A zero-length
    /// transform is complete as soon as it starts.
    pub fn progress(&self, time: f64) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 1.0;
        }
        let elapsed = time - self.start_time;
        if self.looping {
            elapsed.rem_euclid(duration) / duration
        } else {
            (elapsed / duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self, time: f64) -> bool {
        !self.looping && time >= self.end_time
    }

    /// Move both ends of the time window by `offset`.
    pub fn shift(&mut self, offset: f64) {
        self.start_time += offset;
        self.end_time += offset;
    }

    /// The value this transform wants written at `time`, if any.
    ///
    /// Once a non-looping transform has reached its end time the exact end
    /// value is returned instead of an interpolation, so a late frame can
    /// never leave the property short of (or past) its target.
    pub(crate) fn apply(
        &mut self,
        props: &Properties,
        time: f64,
    ) -> (TransformState, Option<PropertyValue>) {
        if time < self.start_time {
            return (TransformState::Pending, None);
        }
        if self.is_complete(time) {
            return (TransformState::Finished, Some(self.target.end_value()));
        }
        let t = self.easing.apply(self.progress(time)) as f32;
        (TransformState::Running, Some(self.target.sample(props, t)))
    }
}
