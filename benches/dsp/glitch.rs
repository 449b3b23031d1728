//! Benchmarks for the glitch engine's capture/playback loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use incant_dsp::{dsp::glitch::GlitchEngine, params::GlitchParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_glitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/glitch");

    // Dense triggering keeps the engine switching between both states
    let params = GlitchParams {
        rate: 1.0,
        stutter: 0.8,
        crush: 0.5,
        reverse: 0.5,
        dry_wet: 1.0,
    };

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.02).sin()).collect();

        let mut engine = GlitchEngine::seeded(7);
        engine.prepare(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("stereo_frames", size), &size, |b, _| {
            b.iter(|| {
                for &x in &input {
                    let mut frame = [x, -x];
                    engine.process_frame(&mut frame, black_box(&params));
                    black_box(frame);
                }
            })
        });
    }

    group.finish();
}
