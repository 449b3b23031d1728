//! Low-level DSP primitives shared by the effects.
//!
//! These components do not allocate once prepared and are realtime-safe, so
//! effects embed them directly. They stay focused on the signal-processing
//! math; parameter mapping and mixing live in the effects themselves.

/// Per-sample all-pass stages and the feedback cascade used by the phaser.
pub mod allpass;
/// Circular multichannel delay buffer with interpolated reads.
pub mod delay;
/// State-variable filter and the one-pole feedback lowpass.
pub mod filter;
/// Capture ring plus stochastic grain scheduler.
pub mod glitch;
pub mod lfo;
pub mod math;
/// Phase-accumulator oscillator with a sine/triangle/square shape knob.
pub mod oscillator;
pub mod saturation;
pub mod smoother;

pub use allpass::AllPassCascade;
pub use delay::DelayLine;
pub use filter::{FilterType, StateVariableFilter, SvfCoefficients};
pub use glitch::{GlitchEngine, GlitchState};
pub use oscillator::Oscillator;
pub use smoother::Smoother;
