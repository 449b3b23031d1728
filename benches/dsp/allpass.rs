//! Benchmarks for the all-pass cascade at each selectable length.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use incant_dsp::dsp::allpass::{AllPassCascade, AllPassStage, STAGE_COUNTS};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_allpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/allpass");
    let coefficient = AllPassStage::coefficient(800.0, SAMPLE_RATE);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffer = input.clone();

        for &stages in &STAGE_COUNTS {
            let mut cascade = AllPassCascade::new(stages);
            group.bench_with_input(
                BenchmarkId::new(format!("{}_stages", stages), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        for sample in buffer.iter_mut() {
                            *sample = cascade.process(0, *sample, black_box(coefficient), 0.5);
                        }
                        black_box(&buffer);
                    })
                },
            );
        }
    }

    group.finish();
}
