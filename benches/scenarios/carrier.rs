//! The full stereo carrier: DC filter, tremolo gain, dry/wet.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_tremolo::{params::TremoloParams, LfoWaveform, Transport, TremoloEngine};

use crate::BLOCK_SIZES;

pub fn bench_carrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/carrier");

    let transport = Transport::playing().with_bpm(120.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| 0.5 * (i as f32 * 0.0576).sin()).collect();
        let (mut left, mut right) = (input.clone(), input.clone());

        let mut engine = TremoloEngine::new(48_000.0);
        group.bench_with_input(BenchmarkId::new("stereo_default", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                engine.process_block(black_box(&mut left), black_box(&mut right), transport);
            })
        });

        let params = TremoloParams {
            waveform: LfoWaveform::SmoothRandom,
            sync: true,
            mix: 0.6,
            ..TremoloParams::default()
        };
        let mut engine = TremoloEngine::new(48_000.0).with_params(&params);
        group.bench_with_input(BenchmarkId::new("stereo_synced_mixed", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                engine.process_block(black_box(&mut left), black_box(&mut right), transport);
            })
        });

        let mut mono = input.clone();
        let mut engine = TremoloEngine::new(48_000.0);
        group.bench_with_input(BenchmarkId::new("mono", size), &size, |b, _| {
            b.iter(|| {
                mono.copy_from_slice(&input);
                engine.process_mono(black_box(&mut mono), transport);
            })
        });
    }

    group.finish();
}
