//! First-order all-pass stages and the feedback cascade built from them.
//!
//! # All-pass Stage
//!
//! A first-order all-pass passes every frequency at unity gain but delays
//! each by a different amount of phase, sweeping from 0° at DC to 180° at
//! Nyquist. The 90° point sits at the "break" frequency set by the
//! coefficient:
//!
//! ```text
//! y[n]  = a * x[n] + s
//! s     = x[n] - a * y[n]
//!
//! a     = (1 - tan(w / 2)) / (1 + tan(w / 2)),   w = 2π f / fs
//! ```
//!
//! # Cascade
//!
//! N stages in series give N * 180° of phase shift across the band. Mixed
//! with the dry signal, every frequency where the total shift hits an odd
//! multiple of 180° cancels, producing N / 2 notches: the phaser sound.
//!
//! ```text
//!          ┌──────────────────────────────────────────┐
//!          │                                          │ tanh(y) * fb
//!          ▼                                          │
//!  x ──▶ (+) ──▶ [AP 1] ──▶ [AP 2] ──▶ ... ──▶ [AP N] ──┴──▶ y
//! ```
//!
//! The whole chain shares one coefficient per sample, and its output is fed
//! back into its input on the next sample. The feedback state is stored after
//! a tanh, so it can never exceed (-1, 1) no matter how hard the loop is
//! driven.

use std::f32::consts::TAU;

use crate::dsp::{filter::max_cutoff, saturation::soft_clip};

/// Largest supported cascade length.
pub const MAX_STAGES: usize = 12;

/// Selectable cascade lengths, one per quartile of the stages knob.
pub const STAGE_COUNTS: [usize; 4] = [4, 6, 8, 12];

#[derive(Debug, Clone, Copy, Default)]
pub struct AllPassStage {
    state: [f32; 2],
}

impl AllPassStage {
    /// Coefficient placing the 90° point at `frequency_hz`.
    ///
    /// The frequency is capped at `max_cutoff(sample_rate)`: past fs / 2 the
    /// tangent wraps and |a| reaches 1, which turns the feedback loop
    /// unstable. A non-positive sample rate yields 0 (a plain one-sample
    /// delay).
    #[inline]
    pub fn coefficient(frequency_hz: f32, sample_rate: f32) -> f32 {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return 0.0;
        }
        let frequency_hz = if frequency_hz.is_nan() {
            0.0
        } else {
            frequency_hz.min(max_cutoff(sample_rate)).max(0.0)
        };
        let w0 = TAU * frequency_hz / sample_rate;
        let t = (w0 * 0.5).tan();
        (1.0 - t) / (1.0 + t)
    }

    #[inline]
    pub fn process(&mut self, channel: usize, input: f32, coefficient: f32) -> f32 {
        let Some(state) = self.state.get_mut(channel) else {
            return input;
        };
        let output = coefficient * input + *state;
        *state = input - coefficient * output;
        output
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 2];
    }
}

pub struct AllPassCascade {
    stages: [AllPassStage; MAX_STAGES],
    active: usize,
    feedback_state: [f32; 2],
}

impl AllPassCascade {
    pub fn new(active: usize) -> Self {
        Self {
            stages: [AllPassStage::default(); MAX_STAGES],
            active: active.clamp(1, MAX_STAGES),
            feedback_state: [0.0; 2],
        }
    }

    pub fn stage_count(&self) -> usize {
        self.active
    }

    /// Change the number of stages in the chain.
    ///
    /// Stages that join the chain start from silence rather than whatever
    /// they held the last time they were active.
    pub fn set_stage_count(&mut self, count: usize) {
        let count = count.clamp(1, MAX_STAGES);
        if count > self.active {
            for stage in &mut self.stages[self.active..count] {
                stage.reset();
            }
        }
        self.active = count;
    }

    /// Run one sample of `channel` through the chain.
    ///
    /// `feedback` scales the previous output (already soft-limited) that is
    /// added to `input` before the first stage.
    #[inline]
    pub fn process(&mut self, channel: usize, input: f32, coefficient: f32, feedback: f32) -> f32 {
        let Some(&stored) = self.feedback_state.get(channel) else {
            return input;
        };

        let mut wet = input + stored * feedback;
        for stage in &mut self.stages[..self.active] {
            wet = stage.process(channel, wet, coefficient);
        }

        self.feedback_state[channel] = soft_clip(wet);
        wet
    }

    /// Soft-limited output of the last sample for `channel`.
    pub fn feedback_state(&self, channel: usize) -> f32 {
        self.feedback_state.get(channel).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.feedback_state = [0.0; 2];
    }
}

impl Default for AllPassCascade {
    fn default() -> Self {
        Self::new(STAGE_COUNTS[2])
    }
}
