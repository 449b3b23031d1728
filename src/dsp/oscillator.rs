use std::f32::consts::TAU;

use crate::dsp::math::lerp;

/*
Phase-Accumulator Oscillator
============================

    phase     0.0 ──────────────▶ 1.0 (wraps back to 0.0)
    increment frequency / sample_rate, added once per sample

The phase lives in [0, 1) and wraps by subtraction, never by `%` or by
recomputing from a running sample count. Subtraction keeps the phase exact
over hours of playback, where a growing sample counter would lose precision.

Shapes
------

`next(shape)` reads a single continuous "softness" knob:

    shape  0.0         1/3                       1.0
           │  sine→tri  │      triangle→square     │
           └────────────┴───────────────────────────┘

    sine      smooth, rounded peaks
    triangle  constant slope, same zero crossings as the sine
    square    +1 for the first half cycle, -1 for the second

All three share phase alignment (rising through zero at phase 0), so the
linear crossfades between them never cancel out.
*/

const SINE_SEGMENT: f32 = 1.0 / 3.0;

pub struct Oscillator {
    phase: f32,
    increment: f32,
    initial_phase: f32,
}

impl Oscillator {
    /// Oscillator starting at phase 0.
    pub fn new() -> Self {
        Self::with_phase(0.0)
    }

    /// Oscillator starting (and resetting) at `initial_phase` cycles.
    pub fn with_phase(initial_phase: f32) -> Self {
        let initial_phase = wrap_phase(initial_phase);
        Self {
            phase: initial_phase,
            increment: 0.0,
            initial_phase,
        }
    }

    /// Set the rate. A non-positive sample rate stops the oscillator.
    pub fn set_frequency(&mut self, frequency_hz: f32, sample_rate: f32) {
        let increment = frequency_hz / sample_rate;
        self.increment = if increment.is_finite() {
            // Keep at most one cycle per sample so a single subtraction wraps
            increment.clamp(0.0, 0.999_999)
        } else {
            0.0
        };
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return to the initial phase.
    pub fn reset(&mut self) {
        self.phase = self.initial_phase;
    }

    /// Current sine value, then advance.
    #[inline]
    pub fn next_sine(&mut self) -> f32 {
        let value = (self.phase * TAU).sin();
        self.advance();
        value
    }

    /// Current shaped value (see module docs for `shape`), then advance.
    #[inline]
    pub fn next(&mut self, shape: f32) -> f32 {
        let value = shaped(self.phase, shape);
        self.advance();
        value
    }

    #[inline]
    fn advance(&mut self) {
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

/// Waveform value at `phase` (cycles) for a given `shape` knob.
#[inline]
pub fn shaped(phase: f32, shape: f32) -> f32 {
    let shape = shape.clamp(0.0, 1.0);
    if shape <= 0.0 {
        return sine(phase);
    }
    if shape < SINE_SEGMENT {
        lerp(sine(phase), triangle(phase), shape / SINE_SEGMENT)
    } else {
        let blend = (shape - SINE_SEGMENT) / (1.0 - SINE_SEGMENT);
        lerp(triangle(phase), square(phase), blend)
    }
}

#[inline]
fn sine(phase: f32) -> f32 {
    (phase * TAU).sin()
}

#[inline]
fn triangle(phase: f32) -> f32 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

#[inline]
fn square(phase: f32) -> f32 {
    if phase < 0.5 {
        1.0
    } else {
        -1.0
    }
}

fn wrap_phase(phase: f32) -> f32 {
    if phase.is_finite() {
        phase.rem_euclid(1.0)
    } else {
        0.0
    }
}
