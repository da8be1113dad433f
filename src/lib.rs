//! Tempo-aware tremolo: an LFO that produces a per-sample gain, plus the
//! thin stereo carrier that applies it.

pub mod dsp;
pub mod engine; // Stereo carrier and cross-thread control
pub mod error;
pub mod params; // Host-facing parameter domain

pub use dsp::{LfoState, LfoWaveform, ShaperWaveform, TremoloLfo};
pub use engine::{TremoloEngine, Transport};
pub use error::{TremoloError, TremoloResult};
pub use params::TremoloParams;

/// Largest chunk the carrier renders at once.
pub const MAX_BLOCK_SIZE: usize = 2048;

pub const MIN_SAMPLE_RATE: f64 = 8_000.0;
pub const MAX_SAMPLE_RATE: f64 = 384_000.0;
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Modulation rate bounds accepted by the core setters, in Hz.
pub const MIN_RATE: f32 = 0.001;
pub const MAX_RATE: f32 = 100.0;
