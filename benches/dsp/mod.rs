//! Benchmarks for low-level DSP primitives.

mod allpass;
mod delay;
mod filter;
mod glitch;
mod oscillator;

pub use allpass::bench_allpass;
pub use delay::bench_delay;
pub use filter::bench_filter;
pub use glitch::bench_glitch;
pub use oscillator::bench_oscillator;
