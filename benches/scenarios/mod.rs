//! Benchmarks for the engine as a host would drive it.

mod carrier;

pub use carrier::bench_carrier;
