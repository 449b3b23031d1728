//! The realtime host for the effects.
//!
//! `EffectEngine` owns one prepared instance of every effect kind and runs
//! the selected one over each block. Everything that crosses threads goes
//! through two narrow doors:
//!
//! - control in, read at the start of each block: discrete commands through
//!   a lock-free queue ([`control`]), whole parameter snapshots through
//!   latest-value slots ([`snapshot`])
//! - levels out, through atomics any thread can read ([`meter`])
//!
//! ```text
//!  control thread                          audio thread
//!  ──────────────                          ────────────
//!  ControlSender ─┬▶ [ rtrb queue ]  ──▶  process_block(block, receiver)
//!                 └▶ [ slot per kind ] ─▶   1. commands, in order
//!                                           2. newest snapshot per kind
//!                                           3. meter input
//!                                           4. active effect, in chunks
//!                                           5. meter output
//!  Arc<LevelMeter> ◀────────────────────────┘
//! ```
//!
//! Switching effects does not reset them: an effect picks up where it left
//! off, delay tails included.

pub mod config;
pub mod control;
pub mod meter;
pub mod snapshot;

use std::sync::Arc;

pub use config::{ConfigError, EngineConfig};
pub use control::{ControlError, ControlMessage, ControlReceiver};
#[cfg(feature = "rtrb")]
pub use control::{control_channel, ControlConsumer, ControlSender};
pub use meter::LevelMeter;
pub use snapshot::{ParameterSlots, SnapshotReader};

use crate::{
    effects::AnyEffect,
    io::AudioBlock,
    params::{EffectKind, EffectParameters},
};

pub struct EffectEngine {
    effects: Vec<AnyEffect>,
    active: EffectKind,
    sample_rate: f32,
    max_block_size: usize,
    max_messages_per_block: usize,
    meter: Arc<LevelMeter>,
}

impl EffectEngine {
    /// Build and prepare every effect. Allocates; call off the audio thread.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut effects: Vec<AnyEffect> = EffectKind::ALL
            .iter()
            .map(|&kind| AnyEffect::new(kind, config.glitch_seed))
            .collect();
        for effect in &mut effects {
            effect.prepare(config.sample_rate, config.max_block_size);
        }

        tracing::info!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            effect = %config.initial_effect,
            seeded = config.glitch_seed.is_some(),
            "effect engine ready"
        );

        Ok(Self {
            effects,
            active: config.initial_effect,
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
            max_messages_per_block: config.control_capacity,
            meter: Arc::new(LevelMeter::new()),
        })
    }

    /// Re-prepare every effect for a new stream format. All effect state is
    /// reinitialized; parameters are kept. Allocates.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> Result<(), ConfigError> {
        config::validate_stream(sample_rate, max_block_size)?;
        for effect in &mut self.effects {
            effect.prepare(sample_rate, max_block_size);
        }
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        tracing::info!(sample_rate, max_block_size, "effect engine re-prepared");
        Ok(())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn active_kind(&self) -> EffectKind {
        self.active
    }

    pub fn select(&mut self, kind: EffectKind) {
        self.active = kind;
    }

    pub fn active(&self) -> &AnyEffect {
        self.effect(self.active)
    }

    pub fn active_mut(&mut self) -> &mut AnyEffect {
        self.effect_mut(self.active)
    }

    pub fn effect(&self, kind: EffectKind) -> &AnyEffect {
        &self.effects[kind.index()]
    }

    pub fn effect_mut(&mut self, kind: EffectKind) -> &mut AnyEffect {
        &mut self.effects[kind.index()]
    }

    /// Handle for reading levels from other threads.
    pub fn meter(&self) -> Arc<LevelMeter> {
        Arc::clone(&self.meter)
    }

    /// Apply a single control message.
    pub fn apply(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SelectEffect(kind) => self.select(kind),
            ControlMessage::Parameters(params) => self.apply_parameters(&params),
            ControlMessage::SetParameter { index, value } => {
                self.active_mut().set_parameter(index, value)
            }
            ControlMessage::Reset => self.active_mut().reset(),
        }
    }

    /// Apply a snapshot to the effect of its own kind, active or not.
    pub fn apply_parameters(&mut self, params: &EffectParameters) {
        self.effect_mut(params.kind()).apply_parameters(params);
    }

    /// Apply pending commands in order, then the newest snapshot of each
    /// kind. Commands stop after one queue's worth so a producer that never
    /// stops cannot stall the block. Returns how many messages and snapshots
    /// were applied.
    pub fn drain<R: ControlReceiver + ?Sized>(&mut self, receiver: &mut R) -> usize {
        let mut applied = 0;
        while applied < self.max_messages_per_block {
            let Some(message) = receiver.pop() else {
                break;
            };
            self.apply(message);
            applied += 1;
        }
        for kind in EffectKind::ALL {
            if let Some(params) = receiver.take_parameters(kind) {
                self.apply_parameters(&params);
                applied += 1;
            }
        }
        applied
    }

    /// Drain control messages, then process `block`.
    pub fn process_block<R: ControlReceiver + ?Sized>(
        &mut self,
        block: &mut AudioBlock<'_>,
        receiver: &mut R,
    ) {
        self.drain(receiver);
        self.process(block);
    }

    /// Run the active effect over `block` and update the meter.
    ///
    /// Blocks longer than the prepared maximum are split into chunks.
    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        if block.is_empty() {
            return;
        }

        let input_level = block.rms();

        let chunk = self.max_block_size.max(1);
        let active = self.active.index();
        let mut start = 0;
        while start < block.len() {
            let mut part = block.slice(start, chunk);
            self.effects[active].process(&mut part);
            start += chunk;
        }

        self.meter.record(input_level, block.rms());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::params::{ChorusParams, GlitchParams};

    fn engine(kind: EffectKind) -> EffectEngine {
        EffectEngine::new(
            EngineConfig::default()
                .with_effect(kind)
                .with_max_block_size(256)
                .with_glitch_seed(1),
        )
        .expect("valid config")
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = EffectEngine::new(EngineConfig::default().with_sample_rate(0.0));
        assert!(matches!(result, Err(ConfigError::InvalidSampleRate(_))));
    }

    #[test]
    fn test_prepare_rejects_oversized_blocks() {
        let mut engine = engine(EffectKind::Delay);
        assert!(engine.prepare(44_100.0, 100_000).is_err());
        assert_eq!(engine.max_block_size(), 256);
        assert!(engine.prepare(44_100.0, 512).is_ok());
        assert_eq!(engine.sample_rate(), 44_100.0);
    }

    #[test]
    fn test_messages_apply_in_order() {
        let mut engine = engine(EffectKind::Delay);
        let mut queue = VecDeque::from(vec![
            ControlMessage::SelectEffect(EffectKind::Chorus),
            ControlMessage::SetParameter {
                index: 0,
                value: 0.1,
            },
            ControlMessage::SetParameter {
                index: 0,
                value: 0.9,
            },
        ]);
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        engine.process_block(&mut AudioBlock::stereo(&mut left, &mut right), &mut queue);

        assert_eq!(engine.active_kind(), EffectKind::Chorus);
        assert_eq!(engine.active().get_parameter(0), 0.9);
        // The delay never saw the writes
        assert_eq!(engine.effect(EffectKind::Delay).get_parameter(0), 0.3);
    }

    #[test]
    fn test_snapshot_targets_its_own_kind() {
        let mut engine = engine(EffectKind::Delay);
        let glitch = GlitchParams {
            rate: 0.05,
            ..GlitchParams::default()
        };
        engine.apply(ControlMessage::Parameters(glitch.into()));
        assert_eq!(engine.active_kind(), EffectKind::Delay);
        assert_eq!(engine.effect(EffectKind::Glitch).get_parameter(0), 0.05);
    }

    #[test]
    fn test_later_snapshot_wins() {
        let mut engine = engine(EffectKind::Chorus);
        let mut queue: VecDeque<ControlMessage> = (1..=5)
            .map(|i| {
                ControlMessage::Parameters(
                    ChorusParams {
                        rate: i as f32 / 10.0,
                        ..ChorusParams::default()
                    }
                    .into(),
                )
            })
            .collect();
        assert_eq!(engine.drain(&mut queue), 5);
        assert_eq!(engine.active().get_parameter(0), 0.5);
    }

    struct Slotted {
        queue: VecDeque<ControlMessage>,
        snapshots: SnapshotReader,
    }

    impl ControlReceiver for Slotted {
        fn pop(&mut self) -> Option<ControlMessage> {
            self.queue.pop_front()
        }

        fn take_parameters(&mut self, kind: EffectKind) -> Option<EffectParameters> {
            self.snapshots.take(kind)
        }
    }

    #[test]
    fn test_newest_slot_snapshot_applies_after_commands() {
        let mut engine = engine(EffectKind::Delay);
        let slots = Arc::new(ParameterSlots::new());
        let mut receiver = Slotted {
            queue: VecDeque::from(vec![
                ControlMessage::SelectEffect(EffectKind::Chorus),
                ControlMessage::SetParameter {
                    index: 0,
                    value: 0.05,
                },
            ]),
            snapshots: SnapshotReader::new(Arc::clone(&slots)),
        };
        for rate in [0.1, 0.2, 0.9] {
            slots.publish(
                ChorusParams {
                    rate,
                    ..ChorusParams::default()
                }
                .into(),
            );
        }

        assert_eq!(engine.drain(&mut receiver), 3);
        assert_eq!(engine.active_kind(), EffectKind::Chorus);
        assert_eq!(engine.active().get_parameter(0), 0.9);

        // Nothing new: the applied snapshot is not re-applied
        engine.apply(ControlMessage::SetParameter {
            index: 0,
            value: 0.3,
        });
        assert_eq!(engine.drain(&mut receiver), 0);
        assert_eq!(engine.active().get_parameter(0), 0.3);
    }

    #[test]
    fn test_drain_is_bounded() {
        let mut engine = EffectEngine::new(EngineConfig::default().with_control_capacity(2))
            .expect("valid config");
        let mut queue = VecDeque::from(vec![ControlMessage::Reset; 5]);
        assert_eq!(engine.drain(&mut queue), 2);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_oversized_block_is_processed_in_chunks() {
        let mut chunked = engine(EffectKind::Chorus);
        let mut reference = engine(EffectKind::Chorus);

        let input: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.07).sin() * 0.5).collect();

        let mut left = input.clone();
        let mut right = input.clone();
        chunked.process(&mut AudioBlock::stereo(&mut left, &mut right));

        let mut expected_left = input.clone();
        let mut expected_right = input;
        for start in (0..1000).step_by(256) {
            let end = (start + 256).min(1000);
            reference.process(&mut AudioBlock::stereo(
                &mut expected_left[start..end],
                &mut expected_right[start..end],
            ));
        }
        assert_eq!(left, expected_left);
        assert_eq!(right, expected_right);
    }

    #[test]
    fn test_meter_tracks_levels() {
        let mut engine = engine(EffectKind::Filter);
        engine.apply(ControlMessage::SetParameter {
            index: 4,
            value: 0.3,
        });
        let meter = engine.meter();
        for _ in 0..20 {
            let mut left = vec![0.5; 256];
            let mut right = vec![0.5; 256];
            engine.process(&mut AudioBlock::stereo(&mut left, &mut right));
        }
        // Highpass removes DC
        assert!((meter.input_level() - 0.5).abs() < 1e-6);
        assert!(meter.output_level() < 0.01);
        assert!(meter.gain_db() < -30.0);
    }

    #[test]
    fn test_switching_keeps_effect_state() {
        let mut engine = engine(EffectKind::Delay);
        let mut left = vec![0.0; 256];
        let mut right = vec![0.0; 256];
        left[0] = 1.0;
        right[0] = 1.0;
        engine.process(&mut AudioBlock::stereo(&mut left, &mut right));

        engine.select(EffectKind::Phaser);
        engine.select(EffectKind::Delay);

        // Default delay: 307 ms. Run silence until the echo is due.
        let mut heard = false;
        for _ in 0..80 {
            let mut left = vec![0.0; 256];
            let mut right = vec![0.0; 256];
            engine.process(&mut AudioBlock::stereo(&mut left, &mut right));
            heard |= left.iter().any(|x| x.abs() > 0.01);
        }
        assert!(heard, "delay tail lost across effect switch");
    }
}
