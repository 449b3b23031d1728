use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{dsp::math::ms_to_samples, params::GlitchParams};

/*
Glitch Engine
=============

The glitch engine keeps a rolling recording of its input and, at random
moments, stops recording and replays a slice of that recording over the
output: forwards or backwards, once or stuttered many times, optionally
crushed to a lower bit depth.

State Machine
-------------

    ┌───────────┐   countdown hits 0    ┌───────────┐
    │ Capturing │ ────────────────────▶ │ Glitching │
    │           │ ◀──────────────────── │           │
    └───────────┘  repeat == repeats    └───────────┘
                   (reschedule countdown)

Capturing
    - every frame is written to the capture ring at the cursor
    - the countdown decrements; at zero a grain is drawn and playback starts
    - output passes through untouched

Glitching
    - the capture ring is frozen (no writes) so the grain cannot be
      overwritten while it plays
    - each output frame is read from the ring at the playback offset
    - when the offset reaches the grain length it rewinds and the repeat
      counter increments; the same grain replays, nothing is redrawn
    - after the last repeat the engine returns to Capturing and schedules
      the next trigger

Grain Addressing
----------------

The ring is frozen while glitching, so the cursor marks the end of the
captured material for the whole event:

    forward:  read = cursor - length + offset     (oldest -> newest)
    reverse:  read = cursor - 1      - offset     (newest -> oldest)

    ring:  ... [c-L] [c-L+1] ... [c-2] [c-1] [c] ...
                 ^ forward offset 0     ^ reverse offset 0

Grain Drawing
-------------

    stutter   length band                     repeats
    0.0       50 - 200 ms (long chunks)       1 - 2
    0.5       27.5 - 125 ms                   1 - 9
    1.0       5 - 50 ms (short stutters)      1 - 16

Length is clamped to [64, capacity - 1] samples. The 64-sample floor keeps
the offset arithmetic well away from zero-length grains.

Scheduling
----------

    interval_ms = 50 + (1 - rate) * 2000
    countdown   = interval_ms in samples * jitter,   jitter in [0.5, 1.5)

The jitter stops dense settings from locking into an audible grid.

Randomness
----------

All draws come from one generator owned by the engine. Seed it and the exact
sequence of triggers and grains is reproducible.
*/

/// Capture ring length.
pub const CAPTURE_SECONDS: f32 = 0.5;
/// Countdown before the first trigger after a reset.
pub const INITIAL_COUNTDOWN_SECONDS: f32 = 0.1;
/// Shortest grain, in samples.
pub const MIN_GRAIN_SAMPLES: usize = 64;
/// Crush amounts at or below this leave samples untouched.
pub const CRUSH_THRESHOLD: f32 = 0.01;
/// Rates below this postpone triggers instead of firing them.
pub const MIN_ACTIVE_RATE: f32 = 0.01;

const MIN_CAPTURE_SAMPLES: usize = MIN_GRAIN_SAMPLES * 2;
const MAX_CHANNELS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchState {
    Capturing,
    Glitching,
}

/// Randomized shape of one glitch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrainPlan {
    pub length: usize,
    pub repeats: usize,
    pub reverse: bool,
}

/// The grain currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grain {
    /// Capture cursor when the grain was triggered.
    pub start: usize,
    pub length: usize,
    pub reverse: bool,
    pub repeats: usize,
    pub repeat: usize,
    pub offset: usize,
}

impl Grain {
    /// Ring index for the current playback offset.
    #[inline]
    pub fn read_index(&self, capacity: usize) -> usize {
        if self.reverse {
            (self.start + capacity - 1 - self.offset % capacity) % capacity
        } else {
            (self.start + capacity - self.length % capacity + self.offset) % capacity
        }
    }
}

/// Length band in milliseconds for a stutter setting.
pub fn grain_band_ms(stutter: f32) -> (f32, f32) {
    let inverse = 1.0 - stutter.clamp(0.0, 1.0);
    (5.0 + inverse * 45.0, 50.0 + inverse * 150.0)
}

/// Largest repeat target for a stutter setting (2 ..= 16).
pub fn max_repeats(stutter: f32) -> usize {
    2 + (stutter.clamp(0.0, 1.0) * 14.0) as usize
}

/// Draw the length, repeat target and direction of a new grain.
pub fn draw_grain<R: Rng + ?Sized>(
    rng: &mut R,
    params: &GlitchParams,
    sample_rate: f32,
    capacity: usize,
) -> GrainPlan {
    let (min_ms, max_ms) = grain_band_ms(params.stutter);
    let length_ms = rng.gen_range(min_ms..=max_ms);
    let length = ms_to_samples(length_ms, sample_rate) as usize;
    let length = length
        .min(capacity.saturating_sub(1))
        .max(MIN_GRAIN_SAMPLES);

    let repeats = rng.gen_range(1..=max_repeats(params.stutter));
    let reverse = rng.gen_bool(f64::from(params.reverse.clamp(0.0, 1.0)));

    GrainPlan {
        length,
        repeats,
        reverse,
    }
}

/// Samples until the next trigger, jittered.
pub fn next_countdown<R: Rng + ?Sized>(rng: &mut R, rate: f32, sample_rate: f32) -> usize {
    let interval_ms = 50.0 + (1.0 - rate.clamp(0.0, 1.0)) * 2000.0;
    let jitter: f32 = rng.gen_range(0.5..1.5);
    ((ms_to_samples(interval_ms, sample_rate) * jitter) as usize).max(1)
}

/// Quantize to a bit depth sliding from 16 bits (crush 0) to 2 bits (crush 1).
#[inline]
pub fn bit_crush(sample: f32, crush: f32) -> f32 {
    let bits = 16.0 - crush.clamp(0.0, 1.0) * 14.0;
    let levels = bits.exp2();
    (sample * levels).round() / levels
}

pub struct GlitchEngine<R = StdRng> {
    capture: Vec<Vec<f32>>,
    capacity: usize,
    cursor: usize,
    countdown: usize,
    state: GlitchState,
    grain: Grain,
    sample_rate: f32,
    triggers: u64,
    rng: R,
}

impl GlitchEngine<StdRng> {
    /// Engine seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine with a fixed seed, for reproducible output.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GlitchEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            capture: Vec::new(),
            capacity: 0,
            cursor: 0,
            countdown: 0,
            state: GlitchState::Capturing,
            grain: Grain::default(),
            sample_rate: 0.0,
            triggers: 0,
            rng,
        }
    }

    /// Allocate the capture ring for `sample_rate` and reset.
    ///
    /// Not realtime-safe.
    pub fn prepare(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            self.capture.clear();
            self.capacity = 0;
            self.sample_rate = 0.0;
            self.reset();
            return;
        }

        let capacity = ((sample_rate * CAPTURE_SECONDS) as usize).max(MIN_CAPTURE_SAMPLES);
        self.capture = vec![vec![0.0; capacity]; MAX_CHANNELS];
        self.capacity = capacity;
        self.sample_rate = sample_rate;
        self.reset();
    }

    pub fn is_prepared(&self) -> bool {
        self.capacity > 0
    }

    pub fn reset(&mut self) {
        for channel in &mut self.capture {
            channel.fill(0.0);
        }
        self.cursor = 0;
        self.state = GlitchState::Capturing;
        self.grain = Grain::default();
        self.countdown = ((self.sample_rate * INITIAL_COUNTDOWN_SECONDS) as usize).max(1);
    }

    pub fn state(&self) -> GlitchState {
        self.state
    }

    /// The grain being played, if any.
    pub fn grain(&self) -> Option<&Grain> {
        match self.state {
            GlitchState::Glitching => Some(&self.grain),
            GlitchState::Capturing => None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn capture_cursor(&self) -> usize {
        self.cursor
    }

    pub fn countdown(&self) -> usize {
        self.countdown
    }

    /// Number of grains triggered since construction.
    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }

    /// Raw capture ring contents.
    pub fn captured(&self, channel: usize, index: usize) -> f32 {
        self.capture
            .get(channel)
            .and_then(|ring| ring.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Advance one frame. `frame` holds one sample per channel (1 or 2) and
    /// is overwritten with grain playback while glitching.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32], params: &GlitchParams) {
        if self.capacity == 0 {
            return;
        }

        if self.state == GlitchState::Capturing {
            for (ring, &sample) in self.capture.iter_mut().zip(frame.iter()) {
                ring[self.cursor] = sample;
            }
            self.cursor += 1;
            if self.cursor >= self.capacity {
                self.cursor = 0;
            }

            self.countdown = self.countdown.saturating_sub(1);
            if self.countdown == 0 {
                self.trigger(params);
            }
        }

        if self.state == GlitchState::Glitching {
            self.play(frame, params);
        }
    }

    fn trigger(&mut self, params: &GlitchParams) {
        if params.rate < MIN_ACTIVE_RATE {
            self.countdown = (self.sample_rate as usize).max(1);
            return;
        }

        let plan = draw_grain(&mut self.rng, params, self.sample_rate, self.capacity);
        self.grain = Grain {
            start: self.cursor,
            length: plan.length,
            reverse: plan.reverse,
            repeats: plan.repeats,
            repeat: 0,
            offset: 0,
        };
        self.state = GlitchState::Glitching;
        self.triggers += 1;
    }

    #[inline]
    fn play(&mut self, frame: &mut [f32], params: &GlitchParams) {
        let index = self.grain.read_index(self.capacity);
        let crush = params.crush > CRUSH_THRESHOLD;
        for (ring, sample) in self.capture.iter().zip(frame.iter_mut()) {
            let captured = ring[index];
            *sample = if crush {
                bit_crush(captured, params.crush)
            } else {
                captured
            };
        }

        self.grain.offset += 1;
        if self.grain.offset >= self.grain.length {
            self.grain.offset = 0;
            self.grain.repeat += 1;
            if self.grain.repeat >= self.grain.repeats {
                self.state = GlitchState::Capturing;
                self.countdown = next_countdown(&mut self.rng, params.rate, self.sample_rate);
            }
        }
    }
}
