//! Per-sample cost of the tremolo LFO.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_tremolo::{LfoWaveform, ShaperWaveform, TremoloLfo};

use crate::BLOCK_SIZES;

fn running(shape: LfoWaveform, rate: f32) -> TremoloLfo {
    let mut lfo = TremoloLfo::new(48_000.0)
        .with_rate(rate)
        .with_depth(0.8)
        .with_waveform(shape);
    lfo.update_active(true, true);
    lfo
}

pub fn bench_tremolo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/tremolo");

    // every waveform at one block size
    let size = 256;
    let mut out = vec![0.0f32; size];
    for shape in LfoWaveform::ALL {
        let mut lfo = running(shape, 5.0);
        group.bench_with_input(BenchmarkId::new(shape.name(), size), &size, |b, _| {
            b.iter(|| lfo.render(black_box(&mut out)))
        });
    }

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];

        let mut lfo = running(LfoWaveform::Sine, 5.0);
        let _ = lfo.set_waveshape(1.5, 0.5, ShaperWaveform::Triangle, true);
        group.bench_with_input(BenchmarkId::new("sine_waveshaped", size), &size, |b, _| {
            b.iter(|| lfo.render(black_box(&mut out)))
        });

        // fastest rate at the lowest sample rate: K = 4
        let mut lfo = TremoloLfo::new(8_000.0)
            .with_rate(100.0)
            .with_waveform(LfoWaveform::Square);
        lfo.update_active(true, true);
        group.bench_with_input(BenchmarkId::new("square_k4", size), &size, |b, _| {
            b.iter(|| lfo.render(black_box(&mut out)))
        });

        let mut lfo = TremoloLfo::new(48_000.0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| lfo.render(black_box(&mut out)))
        });
    }

    group.finish();
}
