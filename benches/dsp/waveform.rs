//! Raw waveform evaluation cost, one block of phases per shape.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_tremolo::dsp::waveform::{self, LfoWaveform, SmoothRandomCache};

pub fn bench_waveform(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/waveform");

    let size = 256;
    let phases: Vec<f64> = (0..size).map(|i| i as f64 / size as f64).collect();

    for shape in LfoWaveform::ALL {
        group.bench_with_input(BenchmarkId::new(shape.name(), size), &size, |b, _| {
            let mut cache = SmoothRandomCache::new();
            b.iter(|| {
                let mut acc = 0.0f32;
                for &phi in &phases {
                    acc += waveform::unipolar_cached(black_box(shape), phi, &mut cache);
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
