//! Exponential parameter smoothing.
//!
//! A parameter snapshot can arrive at any block boundary. Jumping a feedback
//! gain or a dry/wet balance from one value to another mid-stream produces an
//! audible click, so effects that care glide toward the new target with a
//! one-pole ramp:
//!
//! ```text
//!   current[n] = target + (current[n-1] - target) * coeff
//!   coeff      = exp(-1 / (time_seconds * sample_rate))
//! ```
//!
//! After `time_seconds` the remaining distance has shrunk to 1/e (~37%);
//! after five time constants the value is effectively settled.

const SNAP_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    current: f32,
    target: f32,
    coeff: f32,
}

impl Smoother {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            coeff: 0.0,
        }
    }

    /// Set the ramp time constant. A zero or invalid rate disables smoothing.
    pub fn prepare(&mut self, sample_rate: f32, time_seconds: f32) {
        let samples = sample_rate * time_seconds;
        self.coeff = if samples.is_finite() && samples > 0.0 {
            (-1.0 / samples).exp()
        } else {
            0.0
        };
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump straight to the target.
    pub fn reset(&mut self) {
        self.current = self.target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let distance = self.current - self.target;
        if distance.abs() < SNAP_EPSILON {
            self.current = self.target;
        } else {
            self.current = self.target + distance * self.coeff;
        }
        self.current
    }
}
