use crate::animation::values::Interpolatable;
use crate::errors::{ArmatureError, Result};

/// How keyframes are interpolated between sample points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Step,
    Linear,
    CubicSpline,
}

impl InterpolationMode {
    /// Values stored per keyframe time: cubic-spline keeps
    /// `[in-tangent, value, out-tangent]` triples.
    #[must_use]
    pub fn value_stride(self) -> usize {
        match self {
            Self::CubicSpline => 3,
            _ => 1,
        }
    }
}

/// One property's keyframe data, immutable after construction.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Validates and builds a track.
    ///
    /// Times must be strictly ascending and the value array must hold
    /// exactly `times.len() * stride` entries.
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Result<Self> {
        if let Some(bad) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ArmatureError::NonAscendingKeyframes(bad + 1));
        }

        let expected = times.len() * interpolation.value_stride();
        if values.len() != expected {
            return Err(ArmatureError::KeyframeCountMismatch {
                values: values.len(),
                times: times.len(),
                expected,
            });
        }

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationMode {
        self.interpolation
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples the track at `time`.
    ///
    /// Sampling outside the keyframe range clamps to the boundary value; an
    /// empty track yields the neutral value. Sampling is pure: the same time
    /// always produces the same output.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        let len = self.times.len();
        if len == 0 {
            return T::neutral();
        }
        if time <= self.times[0] {
            return self.value_at(0);
        }
        if time >= self.times[len - 1] {
            return self.value_at(len - 1);
        }

        // First keyframe strictly after `time`; the checks above guarantee
        // 0 < next < len.
        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;

        let t0 = self.times[prev];
        let t1 = self.times[next];
        let dt = t1 - t0;
        if dt <= f32::EPSILON {
            return self.value_at(prev);
        }
        let t = ((time - t0) / dt).clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(prev),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(prev), self.value_at(next), t)
            }
            InterpolationMode::CubicSpline => {
                let i0 = prev * 3;
                let i1 = next * 3;

                let v0 = self.values[i0 + 1];
                let out_tangent0 = self.values[i0 + 2];
                let in_tangent1 = self.values[i1];
                let v1 = self.values[i1 + 1];

                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
            }
        }
    }

    /// Plain value at a keyframe index; for cubic-spline tracks the value
    /// sits between its tangents at `index * 3 + 1`.
    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }
}
