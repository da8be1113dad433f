//! Benchmarks for the tremolo primitives and the stereo carrier.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Waveform evaluation, the LFO, the DC filter
//!   - scenarios/*  The full carrier on stereo blocks

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_waveform,
    dsp::bench_tremolo,
    dsp::bench_filter,
    scenarios::bench_carrier,
);
criterion_main!(benches);
