use std::sync::atomic::{AtomicU32, Ordering};

/// Input below this level reports 0 dB of gain change.
pub const SILENCE_THRESHOLD: f32 = 1e-4;
/// Floor for reported gain changes.
pub const MIN_GAIN_DB: f32 = -100.0;

/// Last-block RMS levels, written by the audio thread and readable from any
/// other thread without locking.
///
/// Levels are stored as `f32` bit patterns in atomics. Readers may see the
/// input level of one block next to the output level of the next; each
/// value on its own is always whole.
#[derive(Debug)]
pub struct LevelMeter {
    input: AtomicU32,
    output: AtomicU32,
    gain_db: AtomicU32,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self {
            input: AtomicU32::new(0.0_f32.to_bits()),
            output: AtomicU32::new(0.0_f32.to_bits()),
            gain_db: AtomicU32::new(0.0_f32.to_bits()),
        }
    }

    /// Publish the levels measured around one processed block.
    pub fn record(&self, input: f32, output: f32) {
        self.input.store(input.to_bits(), Ordering::Relaxed);
        self.output.store(output.to_bits(), Ordering::Relaxed);
        self.gain_db
            .store(gain_change_db(input, output).to_bits(), Ordering::Relaxed);
    }

    pub fn input_level(&self) -> f32 {
        f32::from_bits(self.input.load(Ordering::Relaxed))
    }

    pub fn output_level(&self) -> f32 {
        f32::from_bits(self.output.load(Ordering::Relaxed))
    }

    /// Output level relative to input, in dB.
    pub fn gain_db(&self) -> f32 {
        f32::from_bits(self.gain_db.load(Ordering::Relaxed))
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// `20 log10(output / input)`, floored at [`MIN_GAIN_DB`]; 0 dB for silent input.
pub fn gain_change_db(input: f32, output: f32) -> f32 {
    if !(input > SILENCE_THRESHOLD) {
        return 0.0;
    }
    let ratio = output / input;
    if ratio > 0.0 {
        (20.0 * ratio.log10()).max(MIN_GAIN_DB)
    } else {
        MIN_GAIN_DB
    }
}
