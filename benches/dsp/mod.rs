//! Benchmarks for low-level DSP primitives.

mod filter;
mod tremolo;
mod waveform;

pub use filter::bench_filter;
pub use tremolo::bench_tremolo;
pub use waveform::bench_waveform;
