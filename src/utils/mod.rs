//! Utility functions shared by the synthesis blocks.

pub mod polyblep;
pub mod random;

/// Perlin quintic smootherstep: a C2-continuous S-curve with zero first and
/// second derivatives at both endpoints.
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Crossfade from `old_value` to `new_value` along the smootherstep curve.
///
/// A NaN target pins the output to `old_value`, so an invalid parameter can
/// never reach the filters.
#[inline]
pub fn value_at_fade_position(old_value: f32, new_value: f32, fade_ratio: f32) -> f32 {
    if new_value.is_nan() {
        return old_value;
    }
    old_value + (new_value - old_value) * smootherstep(fade_ratio)
}
