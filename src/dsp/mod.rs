//! Low-level DSP primitives behind the tremolo.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! so they can live directly inside the engine and be driven sample by
//! sample from the audio callback. Control-rate setters may be called from
//! another thread only through the engine's control plane.

/// DC-blocking state-variable high-pass.
pub mod filter;
/// Bipolar/unipolar conversion and period math.
pub mod lfo;
/// Gain, dry/wet and level helpers.
pub mod mix;
/// Box-filter oversampling of the modulation signal.
pub mod oversample;
/// Linear parameter smoothing.
pub mod smoother;
/// Tempo to frequency conversion.
pub mod sync;
/// The tremolo LFO and its activation state machine.
pub mod tremolo;
/// Waveform library.
pub mod waveform;
/// Secondary shaping LFO.
pub mod waveshaper;

pub use tremolo::{LfoState, TremoloLfo};
pub use waveform::{LfoWaveform, ShaperWaveform};
