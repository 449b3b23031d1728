use crate::{
    dsp::{
        allpass::{AllPassCascade, AllPassStage, STAGE_COUNTS},
        lfo::{bipolar_to_unipolar, rate_hz},
        math::{map_exponential, quartile},
        oscillator::Oscillator,
    },
    effects::{mix, Effect},
    io::AudioBlock,
    params::PhaserParams,
};

/*
Phaser Effect
=============

    in ──┬───────────────────────────────────────────────▶ (mix) ──▶ out
         │                                                   ▲
         └──▶ [ all-pass cascade, 4/6/8/12 stages ] ─────────┘
                          ▲
                          │ one coefficient per sample
                 LFO ──▶ sweep 100 Hz .. 4 kHz (geometric)

Sweep
-----

    sweep_norm = 0.5 + 0.5 * lfo * depth          (0..1)
    sweep_hz   = 100 * 40 ^ sweep_norm

At zero depth the sweep parks at the geometric midpoint (~632 Hz) instead
of the bottom of the range. At low sample rates the all-pass coefficient
caps the sweep at 0.45 fs, so the top of the range flattens out rather than
folding past Nyquist.

Feedback is capped at 0.85 and the value fed back is passed through tanh
inside the cascade, so the loop stays bounded for any input.
*/

const MIN_RATE_HZ: f32 = 0.05;
const MAX_RATE_HZ: f32 = 5.0;
const MIN_SWEEP_HZ: f32 = 100.0;
const MAX_SWEEP_HZ: f32 = 4_000.0;
const MAX_FEEDBACK: f32 = 0.85;

/// Cascade length for a normalized stages knob.
pub fn stage_count(stages: f32) -> usize {
    STAGE_COUNTS[quartile(stages)]
}

pub struct PhaserEffect {
    params: PhaserParams,
    cascade: AllPassCascade,
    lfo: Oscillator,
    sample_rate: f32,
}

impl PhaserEffect {
    pub fn new() -> Self {
        let params = PhaserParams::default();
        Self {
            params,
            cascade: AllPassCascade::new(stage_count(params.stages)),
            lfo: Oscillator::new(),
            sample_rate: 0.0,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.cascade.stage_count()
    }

    /// Soft-limited cascade output stored for the next sample's feedback.
    pub fn feedback_state(&self, channel: usize) -> f32 {
        self.cascade.feedback_state(channel)
    }
}

impl Default for PhaserEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for PhaserEffect {
    type Params = PhaserParams;

    fn params(&self) -> &PhaserParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut PhaserParams {
        &mut self.params
    }

    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        self.sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            0.0
        };
        self.reset();
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        if self.sample_rate <= 0.0 {
            return;
        }

        let p = self.params;
        self.cascade.set_stage_count(stage_count(p.stages));
        self.lfo
            .set_frequency(rate_hz(p.rate, MIN_RATE_HZ, MAX_RATE_HZ), self.sample_rate);
        let feedback = p.feedback * MAX_FEEDBACK;
        let stereo = block.channels() > 1;

        for i in 0..block.len() {
            let sweep = bipolar_to_unipolar(self.lfo.next_sine() * p.depth);
            let sweep_hz = map_exponential(sweep, MIN_SWEEP_HZ, MAX_SWEEP_HZ);
            let coefficient = AllPassStage::coefficient(sweep_hz, self.sample_rate);

            let (input_l, input_r) = block.frame(i);
            let wet_l = self.cascade.process(0, input_l, coefficient, feedback);
            let wet_r = if stereo {
                self.cascade.process(1, input_r, coefficient, feedback)
            } else {
                wet_l
            };

            block.set_frame(
                i,
                mix(input_l, wet_l, p.dry_wet),
                mix(input_r, wet_r, p.dry_wet),
            );
        }
    }

    fn reset(&mut self) {
        self.cascade.reset();
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::effects::test_support::*;

    fn prepared(params: PhaserParams) -> PhaserEffect {
        let mut effect = PhaserEffect::new();
        effect.set_params(params);
        effect.prepare(SAMPLE_RATE, BLOCK);
        effect
    }

    #[test]
    fn test_stage_quartiles() {
        assert_eq!(stage_count(0.0), 4);
        assert_eq!(stage_count(0.3), 6);
        assert_eq!(stage_count(0.5), 8);
        assert_eq!(stage_count(0.74), 8);
        assert_eq!(stage_count(1.0), 12);
    }

    #[test]
    fn test_stage_change_applies_next_block() {
        let mut effect = prepared(PhaserParams::default());
        run_dc(&mut effect, 0.0, 1);
        assert_eq!(effect.stage_count(), 8);

        effect.set_parameter(3, 0.9);
        run_dc(&mut effect, 0.0, 1);
        assert_eq!(effect.stage_count(), 12);
    }

    #[test]
    fn test_fully_dry_passes_input() {
        let mut effect = prepared(PhaserParams {
            dry_wet: 0.0,
            ..PhaserParams::default()
        });
        let (left, _) = run_dc(&mut effect, 0.4, 3);
        assert!(left.iter().all(|&x| x == 0.4));
    }

    #[test]
    fn test_wet_preserves_level() {
        // All-pass chain: the wet path has unity gain for a steady tone
        let mut effect = prepared(PhaserParams {
            feedback: 0.0,
            depth: 0.0,
            dry_wet: 1.0,
            ..PhaserParams::default()
        });
        let mut osc = Oscillator::new();
        osc.set_frequency(1_000.0, SAMPLE_RATE);
        let mut energy_in = 0.0;
        let mut energy_out = 0.0;
        for block in 0..40 {
            let mut left: Vec<f32> = (0..BLOCK).map(|_| osc.next_sine() * 0.5).collect();
            let mut right = left.clone();
            let input = left.clone();
            effect.process(&mut AudioBlock::stereo(&mut left, &mut right));
            if block >= 10 {
                energy_in += input.iter().map(|x| x * x).sum::<f32>();
                energy_out += left.iter().map(|x| x * x).sum::<f32>();
            }
        }
        let gain = (energy_out / energy_in).sqrt();
        assert!((gain - 1.0).abs() < 0.02, "wet gain {}", gain);
    }

    #[test]
    fn test_feedback_bounded_under_dc() {
        let mut effect = prepared(PhaserParams {
            feedback: 1.0,
            depth: 1.0,
            rate: 1.0,
            stages: 1.0,
            dry_wet: 1.0,
        });
        run_dc(&mut effect, 1.0, 10_000);
        for channel in 0..2 {
            let state = effect.feedback_state(channel);
            assert!(state.abs() < 1.0, "feedback escaped: {}", state);
        }
    }

    #[test]
    fn test_low_sample_rates_stay_bounded() {
        for &rate in &[6_000.0, 7_000.0, 8_000.0] {
            let mut effect = PhaserEffect::new();
            effect.set_params(PhaserParams {
                rate: 1.0,
                depth: 1.0,
                feedback: 1.0,
                stages: 1.0,
                dry_wet: 1.0,
            });
            effect.prepare(rate, BLOCK);

            let mut rng = StdRng::seed_from_u64(17);
            let mut peak = 0.0f32;
            for _ in 0..2_000 {
                let mut left: Vec<f32> = (0..BLOCK)
                    .map(|_| rng.gen_range(-0.5f32..0.5))
                    .collect();
                let mut right = left.clone();
                effect.process(&mut AudioBlock::stereo(&mut left, &mut right));
                for &x in left.iter().chain(&right) {
                    assert!(x.is_finite(), "non-finite output at {} Hz", rate);
                    peak = peak.max(x.abs());
                }
            }
            assert!(peak < 10.0, "peak {} at {} Hz", peak, rate);
        }
    }

    #[test]
    fn test_reset_silences() {
        let mut effect = prepared(PhaserParams {
            feedback: 1.0,
            ..PhaserParams::default()
        });
        assert_reset_silences(&mut effect);
    }

    #[test]
    fn test_unprepared_is_a_no_op() {
        assert_unprepared_passthrough(&mut PhaserEffect::new());
    }
}
