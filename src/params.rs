//! Host-facing parameter domain and the parameter snapshot.
//!
//! Hosts show the rate on an exponential 0.01..25 Hz knob. The core accepts
//! a wider 0.001..100 Hz range; everything a host can reach through these
//! mappings is already valid, so end users never see a clamp.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::sync::{NoteDivision, DEFAULT_BPM};
use crate::dsp::tremolo::{DEFAULT_DEPTH, DEFAULT_RATE};
use crate::dsp::waveform::{LfoWaveform, ShaperWaveform};
use crate::dsp::waveshaper::{DEFAULT_SHAPER_DEPTH, DEFAULT_SHAPER_RATE};

/// Slowest rate on the host knob.
pub const MIN_HOST_RATE: f64 = 0.01;
/// Fastest rate on the host knob.
pub const MAX_HOST_RATE: f64 = 25.0;

/// MAX_HOST_RATE / MIN_HOST_RATE
const HOST_RATE_SPAN: f64 = 2500.0;

pub const MIN_PHASE_OFFSET: f64 = -360.0;
pub const MAX_PHASE_OFFSET: f64 = 360.0;

/// Knob position (0..1) to Hz: `0.01 · 2^(u · log2 2500)`.
pub fn normalized_to_rate(normalized: f64) -> f64 {
    let u = if normalized.is_finite() {
        normalized.clamp(0.0, 1.0)
    } else {
        0.0
    };
    MIN_HOST_RATE * 2f64.powf(u * HOST_RATE_SPAN.log2())
}

/// Hz to knob position (0..1), inverse of [`normalized_to_rate`].
pub fn rate_to_normalized(hz: f64) -> f64 {
    let hz = if hz.is_finite() {
        hz.clamp(MIN_HOST_RATE, MAX_HOST_RATE)
    } else {
        MIN_HOST_RATE
    };
    (hz / MIN_HOST_RATE).log2() / HOST_RATE_SPAN.log2()
}

/// Settings of the secondary shaping LFO.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveshaperParams {
    pub rate: f32,
    pub depth: f32,
    pub waveform: ShaperWaveform,
    pub enabled: bool,
}

impl Default for WaveshaperParams {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SHAPER_RATE,
            depth: DEFAULT_SHAPER_DEPTH,
            waveform: ShaperWaveform::Sine,
            enabled: false,
        }
    }
}

/// Every host parameter in one value.
///
/// The default is the factory preset.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloParams {
    /// Free-running rate in Hz.
    pub rate: f32,
    pub depth: f32,
    /// Dry/wet balance of the carrier.
    pub mix: f32,
    pub waveform: LfoWaveform,
    pub sync: bool,
    pub division: NoteDivision,
    /// Degrees, -360..360.
    pub phase_offset: f64,
    /// Tempo used while no host tempo is reported.
    pub bpm: f64,
    pub waveshaper: WaveshaperParams,
    pub bypass: bool,
}

impl Default for TremoloParams {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            depth: DEFAULT_DEPTH,
            mix: 1.0,
            waveform: LfoWaveform::Sine,
            sync: false,
            division: NoteDivision::Quarter,
            phase_offset: 0.0,
            bpm: DEFAULT_BPM,
            waveshaper: WaveshaperParams::default(),
            bypass: false,
        }
    }
}
