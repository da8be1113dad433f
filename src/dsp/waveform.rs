//! Modulation waveform library.

/*
Modulation Waveforms
====================

Every shape here is a pure function of the normalized phase φ ∈ [0, 1).
There is no oscillator state in this module; the LFOs own their phase and
ask this module what the curve looks like at that point.

Vocabulary
----------

  phase (φ)   Position inside one cycle. 0.0 = start, 0.5 = halfway,
              values are wrapped back into [0, 1) before evaluation.

  θ           The same position in radians: θ = 2πφ.

  bipolar     Output in [-1, +1]. The waveshaper consumes this form.

  unipolar    Output in [0, 1]. The tremolo gain path consumes this form:
                unipolar = (bipolar + 1) / 2


Shapes
------

The first eight shapes are the "simple" set. The waveshaper may only use
these; the primary LFO may use all nineteen.

  Sine            sin θ
  Square          +1 for φ < 0.5, -1 afterwards
  Triangle        2·(1 - |2φ - 1|) - 1
  SawtoothUp      2φ - 1
  SawtoothDown    1 - 2φ
  SoftSquare      2·σ(10·(2φ - 1)) - 1, σ(x) = 1 / (1 + e^-x)
  FenderStyle     ((sin θ + 0.1 sin 2θ + 0.05 sin 3θ)·0.4 + 0.5)^1.08
  WurlitzerStyle  0.6 sin θ + 0.4·(2|2φ - 1| - 1)

The remaining shapes model amp circuits and "character" tremolos:

  VoxStyle        sin(θ + 0.3 sin 2θ)·0.5 + 0.5 + 0.1 sin 3θ
  MagnatoneStyle  0.7 sin θ + 0.3·(1 - (2φ - 1)²)
  PulseDecay      1 - 10φ for φ < 0.1, e^(-4φ) afterwards
  BouncingBall    |sin((πφ)^0.8)|²
  MultiSine       0.5 sin θ + 0.25 sin 2θ + 0.125 sin 3θ
  OpticalStyle    sin θ (negative half ×0.8) + 0.15 sin 2θ, then
                  ((x + 1) / 2)^1.2
  TwinPeaks       Gaussian bumps at φ = 0.25 (weight 1.0) and φ = 0.75
                  (weight 0.8), σ² = 1/32, normalized to peak 1
  SmoothRandom    0.4·(sin θ + 0.5 sin 1.47θ + 0.25 sin 2.39θ
                       + 0.125 sin 3.17θ)
  GuitarPick      linear attack for φ < 0.05, then
                  0.2 + 0.8·e^(-3(φ - 0.05)/0.3)
  VintageChorus   sin θ + 0.3 sin 0.5θ + 0.1 sin 3θ
  SlowGear        swell 1 - e^(-4φ) for φ < 0.7, then
                  swell·e^(-8(φ - 0.7))

Shapes written as a 0..1 curve (Fender, Vox, PulseDecay, BouncingBall,
Optical, TwinPeaks, GuitarPick, SlowGear) are mapped to bipolar with
2u - 1. Every result is clamped to its declared range, so a shape that
overshoots (MultiSine, VintageChorus, Vox) simply flattens at the rails.

The non-integer harmonics in SmoothRandom (1.47, 2.39, 3.17) make the
curve jump slightly at the cycle boundary. That is intentional: it is the
"random" part. Nothing downstream relies on cycle continuity.


Cost
----

SmoothRandom is the most expensive shape (four sin calls). Consecutive
oversampled sub-steps often land within 1e-4 of each other at slow rates,
so the LFO keeps a one-slot cache keyed by φ rounded to 1e-4. A cache
hit therefore always satisfies |φ - cached φ| < 1e-4.
*/

use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Peak of the unnormalized TwinPeaks curve: 1.0 + 0.8·e^-4.
const TWIN_PEAKS_NORM: f64 = 1.014_652_511_5;

/// Shapes available to the primary tremolo LFO.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    SoftSquare,
    FenderStyle,
    WurlitzerStyle,
    VoxStyle,
    MagnatoneStyle,
    PulseDecay,
    BouncingBall,
    MultiSine,
    OpticalStyle,
    TwinPeaks,
    SmoothRandom,
    GuitarPick,
    VintageChorus,
    SlowGear,
}

impl LfoWaveform {
    /// Every shape, in host index order.
    pub const ALL: [LfoWaveform; 19] = [
        LfoWaveform::Sine,
        LfoWaveform::Square,
        LfoWaveform::Triangle,
        LfoWaveform::SawtoothUp,
        LfoWaveform::SawtoothDown,
        LfoWaveform::SoftSquare,
        LfoWaveform::FenderStyle,
        LfoWaveform::WurlitzerStyle,
        LfoWaveform::VoxStyle,
        LfoWaveform::MagnatoneStyle,
        LfoWaveform::PulseDecay,
        LfoWaveform::BouncingBall,
        LfoWaveform::MultiSine,
        LfoWaveform::OpticalStyle,
        LfoWaveform::TwinPeaks,
        LfoWaveform::SmoothRandom,
        LfoWaveform::GuitarPick,
        LfoWaveform::VintageChorus,
        LfoWaveform::SlowGear,
    ];

    /// Look up a shape by host index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Shapes with a one-shot attack/decay profile.
    ///
    /// Switching into or out of these restarts the cycle so the listener
    /// never lands in the middle of a decay tail.
    pub fn is_one_shot(self) -> bool {
        matches!(
            self,
            LfoWaveform::PulseDecay | LfoWaveform::GuitarPick | LfoWaveform::SlowGear
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            LfoWaveform::Sine => "Sine",
            LfoWaveform::Square => "Square",
            LfoWaveform::Triangle => "Triangle",
            LfoWaveform::SawtoothUp => "Saw Up",
            LfoWaveform::SawtoothDown => "Saw Down",
            LfoWaveform::SoftSquare => "Soft Square",
            LfoWaveform::FenderStyle => "Fender",
            LfoWaveform::WurlitzerStyle => "Wurlitzer",
            LfoWaveform::VoxStyle => "Vox",
            LfoWaveform::MagnatoneStyle => "Magnatone",
            LfoWaveform::PulseDecay => "Pulse Decay",
            LfoWaveform::BouncingBall => "Bouncing Ball",
            LfoWaveform::MultiSine => "Multi Sine",
            LfoWaveform::OpticalStyle => "Optical",
            LfoWaveform::TwinPeaks => "Twin Peaks",
            LfoWaveform::SmoothRandom => "Smooth Random",
            LfoWaveform::GuitarPick => "Guitar Pick",
            LfoWaveform::VintageChorus => "Vintage Chorus",
            LfoWaveform::SlowGear => "Slow Gear",
        }
    }
}

/// Shapes available to the waveshaper LFO (the simple set).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaperWaveform {
    #[default]
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
    SoftSquare,
    FenderStyle,
    WurlitzerStyle,
}

impl ShaperWaveform {
    pub const ALL: [ShaperWaveform; 8] = [
        ShaperWaveform::Sine,
        ShaperWaveform::Square,
        ShaperWaveform::Triangle,
        ShaperWaveform::SawtoothUp,
        ShaperWaveform::SawtoothDown,
        ShaperWaveform::SoftSquare,
        ShaperWaveform::FenderStyle,
        ShaperWaveform::WurlitzerStyle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        LfoWaveform::from(self).name()
    }
}

impl From<ShaperWaveform> for LfoWaveform {
    fn from(shape: ShaperWaveform) -> Self {
        match shape {
            ShaperWaveform::Sine => LfoWaveform::Sine,
            ShaperWaveform::Square => LfoWaveform::Square,
            ShaperWaveform::Triangle => LfoWaveform::Triangle,
            ShaperWaveform::SawtoothUp => LfoWaveform::SawtoothUp,
            ShaperWaveform::SawtoothDown => LfoWaveform::SawtoothDown,
            ShaperWaveform::SoftSquare => LfoWaveform::SoftSquare,
            ShaperWaveform::FenderStyle => LfoWaveform::FenderStyle,
            ShaperWaveform::WurlitzerStyle => LfoWaveform::WurlitzerStyle,
        }
    }
}

/// Wrap any finite phase into [0, 1).
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase - phase.floor();
    // -1e-20 - floor(-1e-20) rounds to exactly 1.0
    if wrapped >= 1.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map a 0..1 curve onto -1..1.
#[inline]
fn to_bipolar(unipolar: f64) -> f64 {
    2.0 * unipolar.clamp(0.0, 1.0) - 1.0
}

/// Evaluate `waveform` at `phase`, bipolar form in [-1, 1].
pub fn bipolar(waveform: LfoWaveform, phase: f64) -> f32 {
    let phi = wrap_phase(phase);
    let theta = TAU * phi;

    let y = match waveform {
        LfoWaveform::Sine => theta.sin(),
        LfoWaveform::Square => {
            if phi < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        LfoWaveform::Triangle => 2.0 * (1.0 - (2.0 * phi - 1.0).abs()) - 1.0,
        LfoWaveform::SawtoothUp => 2.0 * phi - 1.0,
        LfoWaveform::SawtoothDown => 1.0 - 2.0 * phi,
        LfoWaveform::SoftSquare => 2.0 * sigmoid(10.0 * (2.0 * phi - 1.0)) - 1.0,
        LfoWaveform::FenderStyle => {
            let harmonics =
                theta.sin() + 0.1 * (2.0 * theta).sin() + 0.05 * (3.0 * theta).sin();
            let base = (harmonics * 0.4 + 0.5).clamp(0.0, 1.0);
            to_bipolar(base.powf(1.08))
        }
        LfoWaveform::WurlitzerStyle => {
            0.6 * theta.sin() + 0.4 * (2.0 * (2.0 * phi - 1.0).abs() - 1.0)
        }
        LfoWaveform::VoxStyle => {
            let warped = (theta + 0.3 * (2.0 * theta).sin()).sin();
            to_bipolar(warped * 0.5 + 0.5 + 0.1 * (3.0 * theta).sin())
        }
        LfoWaveform::MagnatoneStyle => {
            let centered = 2.0 * phi - 1.0;
            0.7 * theta.sin() + 0.3 * (1.0 - centered * centered)
        }
        LfoWaveform::PulseDecay => {
            let u = if phi < 0.1 {
                1.0 - 10.0 * phi
            } else {
                (-4.0 * phi).exp()
            };
            to_bipolar(u)
        }
        LfoWaveform::BouncingBall => {
            let s = (PI * phi).powf(0.8).sin().abs();
            to_bipolar(s * s)
        }
        LfoWaveform::MultiSine => {
            0.5 * theta.sin() + 0.25 * (2.0 * theta).sin() + 0.125 * (3.0 * theta).sin()
        }
        LfoWaveform::OpticalStyle => {
            let mut s = theta.sin();
            if s < 0.0 {
                s *= 0.8;
            }
            s += 0.15 * (2.0 * theta).sin();
            let u = ((s + 1.0) * 0.5).clamp(0.0, 1.0);
            to_bipolar(u.powf(1.2))
        }
        LfoWaveform::TwinPeaks => {
            let a = phi - 0.25;
            let b = phi - 0.75;
            // exp(-d² / 2σ²) with σ² = 1/32
            let bumps = (-16.0 * a * a).exp() + 0.8 * (-16.0 * b * b).exp();
            to_bipolar(bumps / TWIN_PEAKS_NORM)
        }
        LfoWaveform::SmoothRandom => {
            0.4 * (theta.sin()
                + 0.5 * (1.47 * theta).sin()
                + 0.25 * (2.39 * theta).sin()
                + 0.125 * (3.17 * theta).sin())
        }
        LfoWaveform::GuitarPick => {
            let u = if phi < 0.05 {
                phi / 0.05
            } else {
                0.2 + 0.8 * (-3.0 * (phi - 0.05) / 0.3).exp()
            };
            to_bipolar(u)
        }
        LfoWaveform::VintageChorus => {
            theta.sin() + 0.3 * (0.5 * theta).sin() + 0.1 * (3.0 * theta).sin()
        }
        LfoWaveform::SlowGear => {
            let swell = 1.0 - (-4.0 * phi).exp();
            let u = if phi < 0.7 {
                swell
            } else {
                swell * (-8.0 * (phi - 0.7)).exp()
            };
            to_bipolar(u)
        }
    };

    y.clamp(-1.0, 1.0) as f32
}

/// Evaluate `waveform` at `phase`, unipolar form in [0, 1].
#[inline]
pub fn unipolar(waveform: LfoWaveform, phase: f64) -> f32 {
    ((bipolar(waveform, phase) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// One-slot memo for the SmoothRandom curve.
#[derive(Debug, Clone, Copy)]
pub struct SmoothRandomCache {
    key: i64,
    value: f32,
}

impl SmoothRandomCache {
    pub const fn new() -> Self {
        Self {
            key: i64::MIN,
            value: 0.0,
        }
    }

    /// Bipolar SmoothRandom value at `phase`, reusing the last result when
    /// `phase` rounds to the same 1e-4 step.
    #[inline]
    pub fn bipolar(&mut self, phase: f64) -> f32 {
        let phi = wrap_phase(phase);
        let key = (phi * 10_000.0).round() as i64;
        if key != self.key {
            self.key = key;
            self.value = bipolar(LfoWaveform::SmoothRandom, phi);
        }
        self.value
    }

    pub fn invalidate(&mut self) {
        self.key = i64::MIN;
    }
}

impl Default for SmoothRandomCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Unipolar evaluation that routes SmoothRandom through `cache`.
#[inline]
pub fn unipolar_cached(waveform: LfoWaveform, phase: f64, cache: &mut SmoothRandomCache) -> f32 {
    let b = match waveform {
        LfoWaveform::SmoothRandom => cache.bipolar(phase),
        other => bipolar(other, phase),
    };
    ((b + 1.0) * 0.5).clamp(0.0, 1.0)
}
