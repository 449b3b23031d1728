//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use incant_dsp::dsp::delay::DelayLine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let mut line = DelayLine::new();
    line.prepare(2, SAMPLE_RATE as usize);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.0f32; size];

        // Fixed integer tap, 100ms
        group.bench_with_input(BenchmarkId::new("read_write", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in output.iter_mut().zip(input.iter()) {
                    *out = line.read(0, black_box(4_800));
                    line.write(0, x);
                    line.advance();
                }
            })
        });

        // Swept fractional tap, as used by the chorus
        group.bench_with_input(BenchmarkId::new("read_interpolated", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in output.iter_mut().zip(input.iter()).enumerate() {
                    let delay = 960.0 + (i as f32 * 0.01).sin() * 240.0;
                    *out = line.read_interpolated(0, black_box(delay));
                    line.write(0, x);
                    line.advance();
                }
            })
        });
    }

    group.finish();
}
