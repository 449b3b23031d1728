//! Realtime modulation and glitch effects.
//!
//! ```
//! use incant_dsp::{
//!     engine::{EffectEngine, EngineConfig},
//!     io::AudioBlock,
//!     params::EffectKind,
//! };
//!
//! let mut engine = EffectEngine::new(EngineConfig::default().with_effect(EffectKind::Chorus))?;
//! let mut left = vec![0.0; 512];
//! let mut right = vec![0.0; 512];
//! engine.process(&mut AudioBlock::stereo(&mut left, &mut right));
//! # Ok::<(), incant_dsp::engine::ConfigError>(())
//! ```

pub mod dsp; // Allocation-free primitives
pub mod effects; // Delay, chorus, phaser, filter, glitch
pub mod engine; // Effect selection, control queue, metering
pub mod io;
pub mod params; // Normalized parameter records

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
