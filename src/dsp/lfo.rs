//! Low Frequency Oscillator (LFO) helpers.

/*
Low Frequency Oscillators in the Effects
========================================

Every modulated effect in this crate owns one or more `Oscillator`s running
at control rate (well below 20 Hz). The oscillator math is the same as an
audio-rate one; only the frequency range and what the output drives differ.

    effect   LFO range      drives
    ------   ------------   -------------------------------------------
    chorus   0.1 - 5 Hz     delay time (two taps, a quarter cycle apart)
    phaser   0.05 - 5 Hz    all-pass sweep frequency
    filter   0.1 - 10 Hz    cutoff, in octaves around the base cutoff

Bipolar vs Unipolar
-------------------

Oscillators emit bipolar values (-1.0 to +1.0). Sweeps that move *around* a
centre use them directly (chorus delay, filter octaves). Sweeps that move
across a range from a floor use the unipolar form:

    unipolar = (bipolar + 1.0) * 0.5

    bipolar   unipolar
    -1.0      0.0
     0.0      0.5
    +1.0      1.0

The phaser scales the bipolar value by its depth *before* converting, so at
zero depth the sweep parks at the 0.5 midpoint instead of the floor.

Rate Knobs
----------

A normalized rate knob maps linearly onto the effect's LFO range; the range
is narrow enough (two decades at most) that a linear knob still feels even.
*/

use crate::dsp::math::lerp;

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Map a normalized rate knob linearly onto `[min_hz, max_hz]`.
///
/// # Example
/// ```
/// use incant_dsp::dsp::lfo::rate_hz;
/// assert!((rate_hz(0.0, 0.1, 5.0) - 0.1).abs() < 1e-6);
/// assert!((rate_hz(1.0, 0.1, 5.0) - 5.0).abs() < 1e-6);
/// ```
#[inline]
pub fn rate_hz(norm: f32, min_hz: f32, max_hz: f32) -> f32 {
    lerp(min_hz, max_hz, norm)
}
