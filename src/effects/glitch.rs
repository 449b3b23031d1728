use rand::{rngs::StdRng, Rng};

use crate::{
    dsp::glitch::GlitchEngine,
    effects::{mix, Effect},
    io::AudioBlock,
    params::GlitchParams,
};

/// Stutter/reverse/bit-crush effect around a [`GlitchEngine`].
///
/// The engine overwrites the block frame by frame, so the dry input is copied
/// aside first and crossfaded back in at the end. The copy buffers are sized
/// in `prepare`; longer blocks are handled in chunks of that size.
pub struct GlitchEffect<R = StdRng> {
    params: GlitchParams,
    engine: GlitchEngine<R>,
    dry: [Vec<f32>; 2],
}

impl GlitchEffect<StdRng> {
    /// Effect seeded from the operating system.
    pub fn new() -> Self {
        Self::with_engine(GlitchEngine::from_entropy())
    }

    /// Effect with a fixed seed; identical input yields identical output.
    pub fn seeded(seed: u64) -> Self {
        Self::with_engine(GlitchEngine::seeded(seed))
    }
}

impl Default for GlitchEffect<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GlitchEffect<R> {
    pub fn with_engine(engine: GlitchEngine<R>) -> Self {
        Self {
            params: GlitchParams::default(),
            engine,
            dry: [Vec::new(), Vec::new()],
        }
    }

    pub fn engine(&self) -> &GlitchEngine<R> {
        &self.engine
    }

    fn process_chunk(&mut self, block: &mut AudioBlock<'_>) {
        let len = block.len();
        let channels = block.channels();
        for channel in 0..channels {
            if let Some(samples) = block.channel(channel) {
                self.dry[channel][..len].copy_from_slice(samples);
            }
        }

        let params = self.params;
        for i in 0..len {
            let (left, right) = block.frame(i);
            let mut frame = [left, right];
            self.engine.process_frame(&mut frame[..channels], &params);
            block.set_frame(
                i,
                mix(self.dry[0][i], frame[0], params.dry_wet),
                mix(self.dry[1][i], frame[1], params.dry_wet),
            );
        }
    }
}

impl<R: Rng + Send> Effect for GlitchEffect<R> {
    type Params = GlitchParams;

    fn params(&self) -> &GlitchParams {
        &self.params
    }

    fn params_mut(&mut self) -> &mut GlitchParams {
        &mut self.params
    }

    fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.engine.prepare(sample_rate);
        let frames = if self.engine.is_prepared() {
            max_block_size.max(1)
        } else {
            0
        };
        self.dry = [vec![0.0; frames], vec![0.0; frames]];
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        let chunk = self.dry[0].len();
        if !self.engine.is_prepared() || chunk == 0 {
            return;
        }

        let mut start = 0;
        while start < block.len() {
            let mut part = block.slice(start, chunk);
            self.process_chunk(&mut part);
            start += chunk;
        }
    }

    fn reset(&mut self) {
        self.engine.reset();
        for channel in &mut self.dry {
            channel.fill(0.0);
        }
    }
}
