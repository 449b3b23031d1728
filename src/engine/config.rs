use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{params::EffectKind, DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/// Construction-time settings for an [`EffectEngine`](super::EffectEngine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Largest block the host will hand over. Bigger blocks are split.
    pub max_block_size: usize,
    pub initial_effect: EffectKind,
    /// Fixes the glitch engine's random sequence for reproducible renders.
    pub glitch_seed: Option<u64>,
    /// Messages the control queue can hold between two blocks.
    pub control_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: MAX_BLOCK_SIZE,
            initial_effect: EffectKind::Delay,
            glitch_seed: None,
            control_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_effect(mut self, kind: EffectKind) -> Self {
        self.initial_effect = kind;
        self
    }

    pub fn with_glitch_seed(mut self, seed: u64) -> Self {
        self.glitch_seed = Some(seed);
        self
    }

    pub fn with_control_capacity(mut self, capacity: usize) -> Self {
        self.control_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_stream(self.sample_rate, self.max_block_size)?;
        if self.control_capacity == 0 {
            return Err(ConfigError::ZeroControlCapacity);
        }
        Ok(())
    }
}

/// Check a sample rate / block size pair.
pub fn validate_stream(sample_rate: f32, max_block_size: usize) -> Result<(), ConfigError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    if max_block_size == 0 || max_block_size > MAX_BLOCK_SIZE {
        return Err(ConfigError::InvalidBlockSize {
            requested: max_block_size,
            max: MAX_BLOCK_SIZE,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sample rate is zero, negative or not finite
    InvalidSampleRate(f32),
    /// Block size is zero or above the crate-wide maximum
    InvalidBlockSize { requested: usize, max: usize },
    ZeroControlCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(rate) => {
                write!(f, "invalid sample rate: {} Hz", rate)
            }
            ConfigError::InvalidBlockSize { requested, max } => {
                write!(
                    f,
                    "invalid block size: {} frames (must be between 1 and {})",
                    requested, max
                )
            }
            ConfigError::ZeroControlCapacity => {
                write!(f, "control queue capacity must be at least 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_sample_rates() {
        for rate in [0.0, -44_100.0, f32::NAN, f32::INFINITY] {
            let result = EngineConfig::default().with_sample_rate(rate).validate();
            assert!(
                matches!(result, Err(ConfigError::InvalidSampleRate(_))),
                "{} accepted",
                rate
            );
        }
    }

    #[test]
    fn test_rejects_bad_block_sizes() {
        for size in [0, MAX_BLOCK_SIZE + 1] {
            assert_eq!(
                EngineConfig::default().with_max_block_size(size).validate(),
                Err(ConfigError::InvalidBlockSize {
                    requested: size,
                    max: MAX_BLOCK_SIZE
                })
            );
        }
        assert!(EngineConfig::default().with_max_block_size(1).validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_control_capacity() {
        assert_eq!(
            EngineConfig::default().with_control_capacity(0).validate(),
            Err(ConfigError::ZeroControlCapacity)
        );
    }

    #[test]
    fn test_error_display() {
        let message = ConfigError::InvalidBlockSize {
            requested: 4096,
            max: MAX_BLOCK_SIZE,
        }
        .to_string();
        assert!(message.contains("4096"));
        assert!(message.contains("2048"));
    }
}
