//! Easing curves and range helpers used by the motion generator.
//!
//! All functions are pure and operate on `f32` so they can run on the
//! Cortex-M33 FPU without pulling in `libm`.

use core::fmt;

/// Error returned by [`reflect`] for an unusable period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurveError {
    /// The period was zero, negative or NaN.
    NonPositivePeriod,
}

impl fmt::Display for CurveError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NonPositivePeriod => write!(f, "period must be greater than zero"),
        }
    }
}

/// Cubic ease-in-out.
///
/// `4t³` for the first half, `1 - (-2t + 2)³ / 2` for the second. Input is
/// clamped to `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Three-level staircase: `0`, `0.5` or `1`.
///
/// Rounds `t * 2` to the nearest integer (halves away from zero) and divides by two.
#[inline]
pub fn step_jump(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    micromath::F32(t * 2.0).round().0 / 2.0
}

/// Fold an ever-increasing counter into a triangle wave over `[0, period]`.
///
/// `m = value mod 2P`; returns `m` while `m <= P`, `2P - m` afterwards.
pub fn reflect(
    value: f32,
    period: f32,
) -> Result<f32, CurveError> {
    // `!(period > 0.0)` also rejects NaN
    if !(period > 0.0) {
        return Err(CurveError::NonPositivePeriod);
    }

    let span = 2.0 * period;
    let mut m = value % span;
    if m < 0.0 {
        m += span;
    }

    let folded = if m <= period { m } else { span - m };
    Ok(folded.clamp(0.0, period))
}

/// Affine remap of `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// A degenerate input range maps everything to `out_min`.
#[inline]
pub fn map_range(
    x: f32,
    in_min: f32,
    in_max: f32,
    out_min: f32,
    out_max: f32,
) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / span + out_min
}
