use crate::{
    dsp::{
        filter::{max_cutoff, FilterType, StateVariableFilter, SvfCoefficients, MIN_CUTOFF_HZ},
        lfo::rate_hz,
        math::{lerp, map_exponential},
        oscillator::Oscillator,
    },
    effects::Effect,
    io::AudioBlock,
    params::FilterParams,
};

/*
Modulated Filter
================

A resonant state-variable filter whose cutoff can be swept by an LFO.

    base_hz  = 20 * (upper / 20) ^ cutoff,    upper = min(20 kHz, 0.45 fs)
    mod_hz   = base_hz * 2 ^ (lfo * depth * 2)       (±2 octaves)
    Q        = 0.5 .. 20 from the resonance knob

The modulated cutoff is clamped back into [20 Hz, upper] and fresh
coefficients are computed every sample, so fast sweeps stay smooth and tan()
never gets near its pole at fs / 2.

The Type knob picks a response by quartile: lowpass, highpass, bandpass,
notch. The filter output replaces the input; there is no dry/wet.
*/

const MIN_RATE_HZ: f32 = 0.1;
const MAX_RATE_HZ: f32 = 10.0;
const MAX_LFO_OCTAVES: f32 = 2.0;
const MIN_Q: f32 = 0.5;
const MAX_Q: f32 = 20.0;

pub struct FilterEffect {
    params: FilterParams,
    filter: StateVariableFilter,
    lfo: Oscillator,
    sample_rate: f32,
}

impl FilterEffect {
    pub fn new() -> Self {
        Self {
            params: FilterParams::default(),
            filter: StateVariableFilter::new(),
            lfo: Oscillator::new(),
            sample_rate: 0.0,
        }
    }

    /// Unmodulated cutoff for the current parameters.
    pub fn base_cutoff_hz(&self) -> f32 {
        map_exponential(self.params.cutoff, MIN_CUTOFF_HZ, max_cutoff(self.sample_rate))
    }

    pub fn q(&self) -> f32 {
        lerp(MIN_Q, MAX_Q, self.params.resonance)
    }

    pub fn filter_type(&self) -> FilterType {
        FilterType::from_normalized(self.params.filter_type)
    }
}

impl Default for FilterEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for FilterEffect {
    type Params = FilterParams;

    fn params(&self) -> &FilterParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut FilterParams {
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

        let base = self.base_cutoff_hz();
        let q = self.q();
        let filter_type = self.filter_type();
        let octaves = self.params.lfo_depth * MAX_LFO_OCTAVES;
        self.lfo.set_frequency(
            rate_hz(self.params.lfo_rate, MIN_RATE_HZ, MAX_RATE_HZ),
            self.sample_rate,
        );

        let channels = block.channels();
        for i in 0..block.len() {
            let cutoff = base * (self.lfo.next_sine() * octaves).exp2();
            // SvfCoefficients clamps into [20 Hz, max_cutoff]
            let coeffs = SvfCoefficients::new(cutoff, q, self.sample_rate);

            for channel in 0..channels {
                if let Some(samples) = block.channel_mut(channel) {
                    let input = samples[i];
                    samples[i] = self.filter.tick(channel, input, &coeffs).select(filter_type);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.lfo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_support::*;

    fn prepared(params: FilterParams) -> FilterEffect {
        let mut effect = FilterEffect::new();
        effect.set_params(params);
        effect.prepare(SAMPLE_RATE, BLOCK);
        effect
    }

    #[test]
    fn test_cutoff_mapping_endpoints() {
        let low = prepared(FilterParams {
            cutoff: 0.0,
            ..FilterParams::default()
        });
        assert!((low.base_cutoff_hz() - 20.0).abs() < 1e-3);

        let high = prepared(FilterParams {
            cutoff: 1.0,
            ..FilterParams::default()
        });
        assert!((high.base_cutoff_hz() - 20_000.0).abs() < 1.0);

        let mut narrow = FilterEffect::new();
        narrow.set_parameter(0, 1.0);
        narrow.prepare(22_050.0, BLOCK);
        assert!((narrow.base_cutoff_hz() - 22_050.0 * 0.45).abs() < 0.5);
    }

    #[test]
    fn test_q_mapping() {
        assert_eq!(prepared(FilterParams { resonance: 0.0, ..FilterParams::default() }).q(), 0.5);
        assert_eq!(prepared(FilterParams { resonance: 1.0, ..FilterParams::default() }).q(), 20.0);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut effect = prepared(FilterParams {
            cutoff: 0.5,
            filter_type: 0.0,
            ..FilterParams::default()
        });
        let (left, right) = run_dc(&mut effect, 0.5, 40);
        assert!((left[BLOCK - 1] - 0.5).abs() < 1e-3);
        assert!((right[BLOCK - 1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut effect = prepared(FilterParams {
            cutoff: 0.5,
            filter_type: 0.3,
            ..FilterParams::default()
        });
        let (left, _) = run_dc(&mut effect, 0.5, 40);
        assert!(left[BLOCK - 1].abs() < 1e-3);
    }

    #[test]
    fn test_extreme_modulation_stays_finite() {
        let mut effect = prepared(FilterParams {
            cutoff: 1.0,
            resonance: 1.0,
            lfo_rate: 1.0,
            lfo_depth: 1.0,
            filter_type: 0.6,
        });
        let mut osc = Oscillator::new();
        osc.set_frequency(3_000.0, SAMPLE_RATE);
        for _ in 0..400 {
            let mut left: Vec<f32> = (0..BLOCK).map(|_| osc.next_sine()).collect();
            let mut right = left.clone();
            effect.process(&mut AudioBlock::stereo(&mut left, &mut right));
            assert!(left.iter().chain(right.iter()).all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_mono_matches_left_of_stereo() {
        let mut stereo = prepared(FilterParams::default());
        let mut mono = prepared(FilterParams::default());

        let mut left: Vec<f32> = (0..BLOCK).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut right = left.clone();
        let mut mono_samples = left.clone();
        stereo.process(&mut AudioBlock::stereo(&mut left, &mut right));
        mono.process(&mut AudioBlock::mono(&mut mono_samples));
        assert_eq!(left, mono_samples);
    }

    #[test]
    fn test_reset_silences() {
        let mut effect = prepared(FilterParams {
            resonance: 1.0,
            filter_type: 0.6,
            ..FilterParams::default()
        });
        assert_reset_silences(&mut effect);
    }

    #[test]
    fn test_unprepared_is_a_no_op() {
        assert_unprepared_passthrough(&mut FilterEffect::new());
    }
}
