use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::math::quartile;

/*
| type              | passes          | rejects      | output             |
| ----------------- | --------------- | ------------ | ------------------ |
| low-pass          | below cutoff    | above cutoff | v2                 |
| high-pass         | above cutoff    | below cutoff | x - k*v1 - v2      |
| band-pass         | around cutoff   | outside      | v1                 |
| notch / band-stop | outside         | around       | x - k*v1           |

Topology-preserving state-variable filter (two trapezoidal integrators):

    g  = tan(pi * f / fs)      integrator gain (prewarped cutoff)
    k  = 1 / Q                 damping
    a1 = 1 / (1 + g * (g + k))
    a2 = g * a1
    a3 = g * a2

    v3 = x - ic2eq
    v1 = a1 * ic1eq + a2 * v3
    v2 = ic2eq + a2 * ic1eq + a3 * v3
    ic1eq = 2 * v1 - ic1eq
    ic2eq = 2 * v2 - ic2eq

All four responses come from the same two states, so the coefficients can be
recomputed every sample for smooth modulation without any extra memory. The
only hazard is `g`: tan() explodes as f approaches fs / 2, so callers clamp
the cutoff well below Nyquist (see `max_cutoff`).
*/

/// Lowest cutoff any modulated filter may reach.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff in absolute terms; also bounded by `0.45 * sample_rate`.
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

/// Upper cutoff bound for a sample rate: `min(20 kHz, 0.45 * fs)`.
#[inline]
pub fn max_cutoff(sample_rate: f32) -> f32 {
    MAX_CUTOFF_HZ.min(sample_rate * 0.45)
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterType {
    /// Select a response from a normalized knob, one per quartile.
    pub fn from_normalized(value: f32) -> Self {
        match quartile(value) {
            0 => FilterType::LowPass,
            1 => FilterType::HighPass,
            2 => FilterType::BandPass,
            _ => FilterType::Notch,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

impl FilterOutputs {
    #[inline]
    pub fn select(&self, filter_type: FilterType) -> f32 {
        match filter_type {
            FilterType::LowPass => self.lowpass,
            FilterType::HighPass => self.highpass,
            FilterType::BandPass => self.bandpass,
            FilterType::Notch => self.notch,
        }
    }
}

/// Per-sample coefficient set. Transient: computed, used, dropped.
#[derive(Debug, Clone, Copy)]
pub struct SvfCoefficients {
    pub g: f32,
    pub k: f32,
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SvfCoefficients {
    /// Coefficients for `cutoff_hz` and quality `q` at `sample_rate`.
    ///
    /// Cutoff is clamped into `[MIN_CUTOFF_HZ, max_cutoff(sample_rate)]` and
    /// `q` to at least 0.5, so the result is always finite for a positive
    /// sample rate.
    #[inline]
    pub fn new(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let upper = max_cutoff(sample_rate).max(MIN_CUTOFF_HZ);
        let cutoff = if cutoff_hz.is_nan() {
            MIN_CUTOFF_HZ
        } else {
            cutoff_hz.clamp(MIN_CUTOFF_HZ, upper)
        };
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / q.max(0.5);
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { g, k, a1, a2, a3 }
    }

    pub fn is_finite(&self) -> bool {
        [self.g, self.k, self.a1, self.a2, self.a3]
            .iter()
            .all(|c| c.is_finite())
    }
}

/// The two integrator states of one channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvfState {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SvfState {
    #[inline]
    pub fn tick(&mut self, input: f32, c: &SvfCoefficients) -> FilterOutputs {
        let v3 = input - self.ic2eq;
        let v1 = c.a1 * self.ic1eq + c.a2 * v3;
        let v2 = self.ic2eq + c.a2 * self.ic1eq + c.a3 * v3;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: input - c.k * v1 - v2,
            notch: input - c.k * v1,
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

/// Stereo state-variable filter: one state pair per channel, coefficients
/// supplied by the caller on every sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVariableFilter {
    states: [SvfState; 2],
}

impl StateVariableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tick(&mut self, channel: usize, input: f32, coeffs: &SvfCoefficients) -> FilterOutputs {
        match self.states.get_mut(channel) {
            Some(state) => state.tick(input, coeffs),
            None => FilterOutputs {
                lowpass: input,
                bandpass: 0.0,
                highpass: 0.0,
                notch: input,
            },
        }
    }

    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }
}

/// One-pole lowpass: `y += a * (x - y)`.
///
/// Output is a running convex blend of inputs, so it never exceeds the
/// largest input magnitude. Used to darken feedback paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    state: f32,
    a: f32,
}

impl OnePole {
    pub fn set_cutoff(&mut self, cutoff_hz: f32, sample_rate: f32) {
        let a = 1.0 - (-TAU * cutoff_hz / sample_rate).exp();
        self.a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 1.0 };
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state += self.a * (input - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
