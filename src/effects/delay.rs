use crate::{
    dsp::{
        delay::DelayLine,
        filter::{max_cutoff, OnePole},
        math::{lerp, ms_to_samples},
        saturation::{soft_clip, soft_limit},
        smoother::Smoother,
    },
    effects::{mix, Effect},
    io::AudioBlock,
    params::DelayParams,
};

/*
Feedback Delay
==============

    in ──┬──────────────────────────────────────────────▶ (mix) ──▶ soft_limit ──▶ out
         │                                                  ▲
         ▼                                                  │ delayed
       (+) ──▶ tanh ──▶ [ delay line, 10 - 1000 ms ] ───────┤
         ▲                     ▲                            │
         │                     └── one-pole lowpass         │
         │                         (darkens each repeat)    │
         └──── feedback × [ping-pong matrix] ◀──────────────┘

Ping-pong
---------

The feedback for each side is a blend of both delayed channels:

    fb_L = delayed_L * (1 - p) + delayed_R * p
    fb_R = delayed_R * (1 - p) + delayed_L * p

At p = 0 each side echoes itself; at p = 1 every repeat swaps sides.

Stability
---------

- feedback is capped at 0.95 of the knob
- the write path goes through tanh, so every stored sample is in (-1, 1)
- the lowpass is a convex blend of what was written, so it cannot push a
  sample back out of that range

Feedback and dry/wet glide over 50 ms so snapshot changes never click. Delay
time and the filter cutoff apply at the next block.
*/

const MIN_DELAY_MS: f32 = 10.0;
const MAX_DELAY_MS: f32 = 1000.0;
const MAX_FEEDBACK: f32 = 0.95;
const SMOOTHING_SECONDS: f32 = 0.05;
const FILTER_MIN_HZ: f32 = 500.0;
const FILTER_MAX_HZ: f32 = 15_000.0;

pub struct DelayEffect {
    params: DelayParams,
    line: DelayLine,
    feedback_filters: [OnePole; 2],
    feedback: Smoother,
    dry_wet: Smoother,
    sample_rate: f32,
}

impl DelayEffect {
    pub fn new() -> Self {
        let params = DelayParams::default();
        Self {
            params,
            line: DelayLine::new(),
            feedback_filters: [OnePole::default(); 2],
            feedback: Smoother::new(params.feedback * MAX_FEEDBACK),
            dry_wet: Smoother::new(params.dry_wet),
            sample_rate: 0.0,
        }
    }

    /// Delay time in samples for the current parameters.
    pub fn delay_samples(&self) -> usize {
        let delay_ms = lerp(MIN_DELAY_MS, MAX_DELAY_MS, self.params.time);
        let samples = ms_to_samples(delay_ms, self.sample_rate) as usize;
        samples.clamp(1, self.line.capacity().saturating_sub(1).max(1))
    }

    /// Cutoff of the feedback lowpass for the current parameters.
    pub fn filter_cutoff_hz(&self) -> f32 {
        lerp(FILTER_MIN_HZ, FILTER_MAX_HZ, self.params.filter).min(max_cutoff(self.sample_rate))
    }

    /// Stored (post-tanh, post-filter) sample `delay` samples back.
    pub fn feedback_sample(&self, channel: usize, delay: usize) -> f32 {
        self.line.read(channel, delay)
    }

    fn update_targets(&mut self) {
        self.feedback.set_target(self.params.feedback * MAX_FEEDBACK);
        self.dry_wet.set_target(self.params.dry_wet);
    }
}

impl Default for DelayEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for DelayEffect {
    type Params = DelayParams;

    fn params(&self) -> &DelayParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut DelayParams {
        &mut self.params
    }

    fn prepare(&mut self, sample_rate: f32, _max_block_size: usize) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            self.line.prepare(0, 0);
            self.sample_rate = 0.0;
            return;
        }

        self.sample_rate = sample_rate;
        let capacity = ms_to_samples(MAX_DELAY_MS, sample_rate) as usize;
        self.line.prepare(2, capacity);
        self.feedback.prepare(sample_rate, SMOOTHING_SECONDS);
        self.dry_wet.prepare(sample_rate, SMOOTHING_SECONDS);
        self.reset();
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        if self.line.is_empty() || block.is_empty() {
            return;
        }

        self.update_targets();
        let delay = self.delay_samples();
        let ping_pong = self.params.ping_pong;

        for i in 0..block.len() {
            let feedback = self.feedback.next_value();
            let dry_wet = self.dry_wet.next_value();

            let delayed_l = self.line.read(0, delay);
            let delayed_r = self.line.read(1, delay);

            let feedback_l = lerp(delayed_l, delayed_r, ping_pong);
            let feedback_r = lerp(delayed_r, delayed_l, ping_pong);

            let (input_l, input_r) = block.frame(i);

            self.line.write(0, soft_clip(input_l + feedback_l * feedback));
            self.line.write(1, soft_clip(input_r + feedback_r * feedback));
            self.line.advance();

            block.set_frame(
                i,
                soft_limit(mix(input_l, delayed_l, dry_wet)),
                soft_limit(mix(input_r, delayed_r, dry_wet)),
            );
        }

        // Darken what was just written so the next pass round the loop
        // comes back duller.
        let cutoff = self.filter_cutoff_hz();
        let written = block.len();
        for (channel, filter) in self.feedback_filters.iter_mut().enumerate() {
            filter.set_cutoff(cutoff, self.sample_rate);
            self.line
                .for_each_recent(channel, written, |sample| *sample = filter.process(*sample));
        }
    }

    fn reset(&mut self) {
        self.line.reset();
        for filter in &mut self.feedback_filters {
            filter.reset();
        }
        self.update_targets();
        self.feedback.reset();
        self.dry_wet.reset();
    }
}
