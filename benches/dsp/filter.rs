//! Benchmarks for the state-variable filter with per-sample coefficients.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use incant_dsp::dsp::filter::{FilterType, StateVariableFilter, SvfCoefficients};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Coefficients computed once per block
        let mut filter = StateVariableFilter::new();
        let coeffs = SvfCoefficients::new(1_000.0, 2.0, SAMPLE_RATE);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = filter.tick(0, *sample, &coeffs).select(FilterType::LowPass);
                }
                black_box(&buffer);
            })
        });

        // Coefficients recomputed every sample, as in the modulated filter
        let mut filter = StateVariableFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let cutoff = 1_000.0 + i as f32;
                    let coeffs = SvfCoefficients::new(black_box(cutoff), 2.0, SAMPLE_RATE);
                    *sample = filter.tick(0, *sample, &coeffs).select(FilterType::BandPass);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
