//! Small mapping helpers shared by every effect.
//!
//! Effects receive normalized (0.0 - 1.0) parameters. These helpers turn them
//! into physical quantities: milliseconds into samples, normalized knobs into
//! frequencies on a geometric scale, and so on.

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map a normalized value onto `[min, max]` geometrically.
///
/// `0.0 -> min`, `1.0 -> max`, and equal steps of `norm` multiply the result
/// by equal ratios. This is how pitch and cutoff knobs feel "even" to the ear.
///
/// # Example
/// ```
/// use incant_dsp::dsp::math::map_exponential;
/// let mid = map_exponential(0.5, 20.0, 20_000.0);
/// assert!((mid - 632.455).abs() < 0.01);
/// ```
#[inline]
pub fn map_exponential(norm: f32, min: f32, max: f32) -> f32 {
    min * (max / min).powf(norm)
}

/// Convert a duration in milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Quartile index (0..=3) of a normalized selector knob.
///
/// Used by every "discrete choice" parameter: filter type, phaser stages.
#[inline]
pub fn quartile(norm: f32) -> usize {
    if norm < 0.25 {
        0
    } else if norm < 0.5 {
        1
    } else if norm < 0.75 {
        2
    } else {
        3
    }
}
