//! Demo runner: plays the test arpeggio through one effect while the main
//! thread sweeps a parameter over the control queue.

use std::{
    f32::consts::TAU,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use incant_dsp::{
    engine::{control_channel, EffectEngine, EngineConfig},
    io::{converter::interleave, AudioBlock},
    params::{EffectKind, EffectParameters},
    MAX_BLOCK_SIZE,
};

use super::source::Arpeggio;

const CONTROL_INTERVAL: Duration = Duration::from_millis(50);
const REPORT_INTERVAL: Duration = Duration::from_secs(1);
const SWEEP_PERIOD_SECONDS: f32 = 8.0;

pub struct Demo {
    effect: EffectKind,
    seconds: f32,
}

impl Demo {
    pub fn new(effect: EffectKind) -> Self {
        Self {
            effect,
            seconds: 10.0,
        }
    }

    pub fn seconds(mut self, seconds: f32) -> Self {
        self.seconds = if seconds.is_finite() {
            seconds.clamp(0.0, 86_400.0)
        } else {
            0.0
        };
        self
    }

    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let engine_config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_max_block_size(MAX_BLOCK_SIZE)
            .with_effect(self.effect);
        let capacity = engine_config.control_capacity;
        let mut engine = EffectEngine::new(engine_config).wrap_err("failed to build effect engine")?;
        let meter = engine.meter();
        let (mut sender, mut receiver) = control_channel(capacity);

        let swept = swept_parameter(self.effect);
        let mut params = EffectParameters::defaults(self.effect);
        tracing::info!(
            effect = %self.effect,
            sample_rate,
            channels,
            sweeping = engine.active().parameter_name(swept),
            "starting demo"
        );

        let mut source = Arpeggio::new(sample_rate);
        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels.max(1);
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let (l, r) = (&mut left[..frames], &mut right[..frames]);
                    source.fill(l, r);
                    engine.process_block(&mut AudioBlock::stereo(l, r), &mut receiver);

                    let out = &mut data[frames_written * channels..(frames_written + frames) * channels];
                    interleave(l, r, out, channels);
                    frames_written += frames;
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play()?;

        let started = Instant::now();
        let mut last_report = started;
        let duration = Duration::from_secs_f32(self.seconds);

        while started.elapsed() < duration {
            std::thread::sleep(CONTROL_INTERVAL);

            let t = started.elapsed().as_secs_f32();
            let value = 0.5 + 0.5 * (TAU * t / SWEEP_PERIOD_SECONDS).sin();
            params.set(swept, value);
            sender
                .set_parameters(params)
                .wrap_err("audio stream stopped taking parameters")?;

            if last_report.elapsed() >= REPORT_INTERVAL {
                last_report = Instant::now();
                tracing::debug!(
                    input = meter.input_level(),
                    output = meter.output_level(),
                    gain_db = meter.gain_db(),
                    swept = value,
                    "levels"
                );
            }
        }

        tracing::info!("demo finished");
        Ok(())
    }
}

/// The parameter each effect sweeps during the demo.
fn swept_parameter(kind: EffectKind) -> usize {
    match kind {
        EffectKind::Delay => 2,  // Filter
        EffectKind::Chorus => 0, // Rate
        EffectKind::Phaser => 2, // Feedback
        EffectKind::Filter => 0, // Cutoff
        EffectKind::Glitch => 1, // Stutter
    }
}
