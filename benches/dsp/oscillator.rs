//! Benchmarks for the phase-accumulator oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use incant_dsp::dsp::oscillator::Oscillator;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut osc = Oscillator::new();
        osc.set_frequency(2.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.next_sine();
                }
                black_box(&buffer);
            })
        });

        // Triangle -> square blend region
        let mut osc = Oscillator::new();
        osc.set_frequency(2.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("shaped", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = osc.next(black_box(0.7));
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
