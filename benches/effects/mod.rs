//! Complete effect benchmarks.
//!
//! Every effect runs on a stereo block with its default parameters, the way
//! a host would drive it.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use incant_dsp::{
    effects::AnyEffect,
    engine::{ControlMessage, EffectEngine, EngineConfig},
    io::AudioBlock,
    params::EffectKind,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn test_signal(size: usize) -> Vec<f32> {
    (0..size).map(|i| (i as f32 * 0.0573).sin() * 0.5).collect()
}

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("effects");

    for &size in BLOCK_SIZES {
        let input = test_signal(size);
        let mut left = input.clone();
        let mut right = input.clone();

        for kind in EffectKind::ALL {
            let mut effect = AnyEffect::new(kind, Some(1));
            effect.prepare(SAMPLE_RATE, size);

            group.bench_with_input(BenchmarkId::new(kind.id(), size), &size, |b, _| {
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    effect.process(&mut AudioBlock::stereo(&mut left, &mut right));
                    black_box(&left);
                })
            });
        }
    }

    group.finish();
}

/// Engine overhead on top of the effect: metering and an empty control drain.
pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("effects/engine");

    for &size in BLOCK_SIZES {
        let input = test_signal(size);
        let mut left = input.clone();
        let mut right = input.clone();

        let config = EngineConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_max_block_size(size)
            .with_effect(EffectKind::Phaser)
            .with_glitch_seed(1);
        let Ok(mut engine) = EffectEngine::new(config) else {
            continue;
        };
        let mut queue: VecDeque<ControlMessage> = VecDeque::new();

        group.bench_with_input(BenchmarkId::new("phaser", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                engine.process_block(&mut AudioBlock::stereo(&mut left, &mut right), &mut queue);
                black_box(&left);
            })
        });
    }

    group.finish();
}
