use crate::{
    dsp::{
        delay::DelayLine,
        lfo::rate_hz,
        math::{lerp, ms_to_samples},
        oscillator::Oscillator,
        saturation::soft_limit,
    },
    effects::{mix, Effect},
    io::AudioBlock,
    params::ChorusParams,
};

/*
Chorus Effect
=============

Chorus thickens a sound by mixing the dry signal with a slightly delayed,
pitch-modulated copy. As the delay time sweeps, the copy is pitched up and
down a little, which reads as several players on the same part.

Stereo Taps
-----------

Each channel has its own tap and its own LFO. The right LFO starts a quarter
cycle ahead of the left, so when one side's delay is at its centre the other
is at an extreme:

    delay_L = base + sin(2π φ)        * depth
    delay_R = base + sin(2π (φ + ¼))  * depth

Parameters
----------

Rate (0.1 - 5.0 Hz):
  LFO speed. Slow = shimmer, fast = vibrato-like wobble.

Depth (0.5 - 5.0 ms):
  How far the delay swings either side of the base.

Delay (5 - 30 ms):
  Centre delay. Short = flanger-ish comb, long = doubling.

Feedback (0 - 0.7):
  Re-injects the tap into the line. The write path is soft-limited, so even
  a DC input settles instead of growing.

Mix:
  Linear dry/wet, applied instantly.
*/

const CAPACITY_MS: f32 = 50.0;
const MIN_RATE_HZ: f32 = 0.1;
const MAX_RATE_HZ: f32 = 5.0;
const MIN_BASE_MS: f32 = 5.0;
const MAX_BASE_MS: f32 = 30.0;
const MIN_DEPTH_MS: f32 = 0.5;
const MAX_DEPTH_MS: f32 = 5.0;
const MAX_FEEDBACK: f32 = 0.7;
const RIGHT_PHASE_OFFSET: f32 = 0.25;

pub struct ChorusEffect {
    params: ChorusParams,
    line: DelayLine,
    lfo_left: Oscillator,
    lfo_right: Oscillator,
    sample_rate: f32,
}

impl ChorusEffect {
    pub fn new() -> Self {
        Self {
            params: ChorusParams::default(),
            line: DelayLine::new(),
            lfo_left: Oscillator::new(),
            lfo_right: Oscillator::with_phase(RIGHT_PHASE_OFFSET),
            sample_rate: 0.0,
        }
    }

    /// Stored (soft-limited) sample `delay` samples back.
    pub fn feedback_sample(&self, channel: usize, delay: usize) -> f32 {
        self.line.read(channel, delay)
    }

    pub fn lfo_phases(&self) -> (f32, f32) {
        (self.lfo_left.phase(), self.lfo_right.phase())
    }
}

impl Default for ChorusEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for ChorusEffect {
    type Params = ChorusParams;

    fn params(&self) -> &ChorusParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ChorusParams {
        &mut self.params
    }

    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            self.line.prepare(0, 0);
            self.sample_rate = 0.0;
            return;
        }

        self.sample_rate = sample_rate;
        self.line
            .prepare(2, ms_to_samples(CAPACITY_MS, sample_rate) as usize);
        self.reset();
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        if self.line.is_empty() {
            return;
        }

        let p = self.params;
        let lfo_hz = rate_hz(p.rate, MIN_RATE_HZ, MAX_RATE_HZ);
        self.lfo_left.set_frequency(lfo_hz, self.sample_rate);
        self.lfo_right.set_frequency(lfo_hz, self.sample_rate);

        let base = ms_to_samples(lerp(MIN_BASE_MS, MAX_BASE_MS, p.delay), self.sample_rate);
        let depth = ms_to_samples(lerp(MIN_DEPTH_MS, MAX_DEPTH_MS, p.depth), self.sample_rate);
        let feedback = p.feedback * MAX_FEEDBACK;

        for i in 0..block.len() {
            let delay_l = base + self.lfo_left.next_sine() * depth;
            let delay_r = base + self.lfo_right.next_sine() * depth;

            let delayed_l = self.line.read_interpolated(0, delay_l);
            let delayed_r = self.line.read_interpolated(1, delay_r);

            let (input_l, input_r) = block.frame(i);

            self.line.write(0, soft_limit(input_l + delayed_l * feedback));
            self.line.write(1, soft_limit(input_r + delayed_r * feedback));
            self.line.advance();

            block.set_frame(
                i,
                mix(input_l, delayed_l, p.dry_wet),
                mix(input_r, delayed_r, p.dry_wet),
            );
        }
    }

    fn reset(&mut self) {
        self.line.reset();
        self.lfo_left.reset();
        self.lfo_right.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::*;

    fn prepared(params: ChorusParams) -> ChorusEffect {
        let mut effect = ChorusEffect::new();
        effect.set_params(params);
        effect.prepare(SAMPLE_RATE, BLOCK);
        effect
    }

    #[test]
    fn test_fully_dry_passes_input() {
        let mut effect = prepared(ChorusParams {
            dry_wet: 0.0,
            ..ChorusParams::default()
        });
        let mut left: Vec<f32> = (0..BLOCK).map(|i| (i as f32 * 0.03).sin() * 0.5).collect();
        let mut right = left.clone();
        let expected = left.clone();
        effect.process(&mut AudioBlock::stereo(&mut left, &mut right));
        assert_eq!(left, expected);
    }

    #[test]
    fn test_wet_signal_is_delayed() {
        let mut effect = prepared(ChorusParams {
            depth: 0.0,
            delay: 0.0,
            rate: 0.0,
            feedback: 0.0,
            dry_wet: 1.0,
        });
        let mut left = vec![0.0; BLOCK * 2];
        let mut right = vec![0.0; BLOCK * 2];
        left[0] = 1.0;
        effect.process(&mut AudioBlock::stereo(&mut left, &mut right));

        // 5 ms base +- 0.5 ms: the impulse must land between 216 and 264
        let peak = left
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        assert!((216..=264).contains(&peak), "impulse arrived at {}", peak);
        assert_eq!(left[0], 0.0);
    }

    #[test]
    fn test_right_lfo_leads_by_quarter_cycle() {
        let mut effect = prepared(ChorusParams::default());
        assert_eq!(effect.lfo_phases(), (0.0, 0.25));
        run_dc(&mut effect, 0.0, 10);
        let (left, right) = effect.lfo_phases();
        let diff = (right - left).rem_euclid(1.0);
        assert!((diff - 0.25).abs() < 1e-3, "phase offset drifted to {}", diff);
    }

    #[test]
    fn test_feedback_bounded_under_dc() {
        let mut effect = prepared(ChorusParams {
            feedback: 1.0,
            depth: 1.0,
            rate: 1.0,
            dry_wet: 1.0,
            delay: 0.0,
        });
        let (left, right) = run_dc(&mut effect, 1.0, 10_000);
        for delay in 1..effect.line.capacity() {
            for channel in 0..2 {
                let stored = effect.feedback_sample(channel, delay);
                assert!(stored.abs() < 1.0, "feedback escaped: {}", stored);
            }
        }
        assert!(left.iter().chain(right.iter()).all(|x| x.abs() < 1.0));
    }

    #[test]
    fn test_reset_restores_lfo_phases() {
        let mut effect = prepared(ChorusParams::default());
        run_dc(&mut effect, 0.3, 5);
        effect.reset();
        assert_eq!(effect.lfo_phases(), (0.0, 0.25));
    }

    #[test]
    fn test_reset_silences() {
        let mut effect = prepared(ChorusParams {
            feedback: 1.0,
            ..ChorusParams::default()
        });
        assert_reset_silences(&mut effect);
    }

    #[test]
    fn test_unprepared_is_a_no_op() {
        assert_unprepared_passthrough(&mut ChorusEffect::new());
    }
}
