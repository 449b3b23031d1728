//! Test signal: a short looping arpeggio of decaying notes with gaps between
//! them, so delay tails and glitch repeats are easy to hear.

use incant_dsp::dsp::{math::ms_to_samples, oscillator::Oscillator};

const NOTES_HZ: [f32; 8] = [220.0, 277.18, 329.63, 440.0, 329.63, 277.18, 246.94, 196.0];
const NOTE_MS: f32 = 250.0;
const DECAY_MS: f32 = 60.0;
const SHAPE: f32 = 0.5;
const LEVEL: f32 = 0.4;
const DETUNE: f32 = 1.003;

pub struct Arpeggio {
    left: Oscillator,
    right: Oscillator,
    sample_rate: f32,
    note_samples: usize,
    decay: f32,
    position: usize,
    note: usize,
    envelope: f32,
}

impl Arpeggio {
    pub fn new(sample_rate: f32) -> Self {
        let mut arp = Self {
            left: Oscillator::new(),
            right: Oscillator::new(),
            sample_rate,
            note_samples: (ms_to_samples(NOTE_MS, sample_rate) as usize).max(1),
            decay: (-1.0 / ms_to_samples(DECAY_MS, sample_rate)).exp(),
            position: 0,
            note: 0,
            envelope: 1.0,
        };
        arp.tune();
        arp
    }

    pub fn fill(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = self.left.next(SHAPE) * self.envelope * LEVEL;
            *r = self.right.next(SHAPE) * self.envelope * LEVEL;
            self.envelope *= self.decay;

            self.position += 1;
            if self.position >= self.note_samples {
                self.position = 0;
                self.note = (self.note + 1) % NOTES_HZ.len();
                self.envelope = 1.0;
                self.tune();
            }
        }
    }

    fn tune(&mut self) {
        let hz = NOTES_HZ[self.note];
        self.left.set_frequency(hz, self.sample_rate);
        self.right.set_frequency(hz * DETUNE, self.sample_rate);
    }
}
