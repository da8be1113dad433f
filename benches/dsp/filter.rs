//! Benchmarks for the carrier DC blocker.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_tremolo::dsp::filter::SVFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() + 0.1).collect();
        let mut buffer = input.clone();

        let mut filter = SVFilter::dc_blocker();
        filter.prepare(48_000.0);
        group.bench_with_input(BenchmarkId::new("dc_blocker", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
