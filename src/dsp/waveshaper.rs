//! Secondary LFO that bends the primary tremolo shape.

/*
Waveshaper LFO
==============

The waveshaper is a second, fully independent oscillator. Its bipolar
output is ADDED to the primary LFO in bipolar space and the sum is
clamped, so it pushes the tremolo curve up and down at its own rate:

    primary (bipolar)   b ∈ [-1, 1]
    shaper              s ∈ [-depth, depth]
    combined            clamp(b + s, -1, 1)

With a slow shaper under a fast primary you get a tremolo whose "floor"
drifts; with a fast shaper under a slow primary you get a pulsing swell.


Tick Rate
---------

The primary LFO asks for one shaping value per oversampled sub-step, not
one per audio sample. The shaper is therefore clocked at

    tick_rate = sample_rate × K_primary

and the primary keeps that in sync whenever its own K changes. Internally
the shaper oversamples again by its own K (chosen from its rate against
the tick rate, same rule as the primary).


Click-Free Disable
------------------

Turning the shaper off must not snap its contribution to zero. Instead
the last output decays geometrically, 0.99 per tick, until it falls
below 1e-4 and snaps to exactly 0.0:

    |s|
    0.5 ┐╲
        │ ╲
        │  ╲___
        │      ╲______
    0.0 └─────────────╲─────  snapped at 1e-4

At 48 kHz with K = 2 that takes about 424 audio samples from |s| = 0.5.
Once it is zero, the combiner is an exact no-op.
*/

use crate::dsp::oversample::{factor_for, OversampleRing};
use crate::dsp::smoother::{Smoother, DEPTH_SMOOTHING_SECONDS, RATE_SMOOTHING_SECONDS};
use crate::dsp::waveform::{self, wrap_phase, LfoWaveform, ShaperWaveform};
use crate::error::{validate_f32, TremoloError, TremoloResult};
use crate::{MAX_RATE, MIN_RATE};

/// Per-tick decay applied to the output while disabled.
const DISABLE_DECAY: f32 = 0.99;
/// Below this the decaying output snaps to zero.
const SILENCE_FLOOR: f32 = 1e-4;

pub const DEFAULT_SHAPER_RATE: f32 = 3.0;
pub const DEFAULT_SHAPER_DEPTH: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct WaveshaperLfo {
    phase: f64,
    tick_rate: f64,
    rate: Smoother,
    depth: Smoother,
    waveform: ShaperWaveform,
    enabled: bool,
    ring: OversampleRing,
    last_output: f32,
}

impl WaveshaperLfo {
    pub fn new(tick_rate: f64) -> Self {
        let mut shaper = Self {
            phase: 0.0,
            tick_rate,
            rate: Smoother::new(DEFAULT_SHAPER_RATE as f64, RATE_SMOOTHING_SECONDS, tick_rate),
            depth: Smoother::new(DEFAULT_SHAPER_DEPTH as f64, DEPTH_SMOOTHING_SECONDS, tick_rate),
            waveform: ShaperWaveform::Sine,
            enabled: false,
            ring: OversampleRing::new(),
            last_output: 0.0,
        };
        shaper.update_oversampling();
        shaper
    }

    /// Set the clock this shaper is ticked at (audio rate × primary K).
    ///
    /// Ramps in flight (including the enable fade-in) carry on at the new
    /// clock.
    pub(crate) fn set_tick_rate(&mut self, tick_rate: f64) {
        if tick_rate == self.tick_rate {
            return;
        }
        self.tick_rate = tick_rate;
        self.rate.rescale(tick_rate);
        self.depth.rescale(tick_rate);
        self.update_oversampling();
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Configure everything at once.
    ///
    /// Rate and depth are clamped into range. The first out-of-range value
    /// is reported; both are still applied. A non-finite value keeps the
    /// current setting.
    pub fn set_parameters(
        &mut self,
        rate: f32,
        depth: f32,
        waveform: ShaperWaveform,
        enabled: bool,
    ) -> TremoloResult<()> {
        let (rate, rate_result) = validate_f32(
            rate,
            MIN_RATE,
            MAX_RATE,
            self.rate(),
            TremoloError::InvalidRate,
        );
        let (depth, depth_result) =
            validate_f32(depth, 0.0, 1.0, self.depth(), TremoloError::InvalidDepth);

        self.rate.set_target(rate as f64);
        self.update_oversampling();

        if enabled && !self.enabled {
            // fade in from wherever the output currently is
            self.depth.snap(0.0);
        }
        self.depth.set_target(depth as f64);

        self.waveform = waveform;
        self.enabled = enabled;

        rate_result.and(depth_result)
    }

    fn update_oversampling(&mut self) {
        let k = factor_for(self.rate.target(), self.tick_rate);
        // k always comes from factor_for, so it fits the ring
        let _ = self.ring.resize(k);
    }

    /// Produce the next shaping value in [-depth, depth].
    #[inline]
    pub fn next_shaping(&mut self) -> f32 {
        if !self.enabled {
            if self.last_output != 0.0 {
                self.last_output *= DISABLE_DECAY;
                if self.last_output.abs() < SILENCE_FLOOR {
                    self.last_output = 0.0;
                }
            }
            return self.last_output;
        }

        let rate = self.rate.next();
        let depth = self.depth.next() as f32;

        let k = self.ring.factor();
        let increment = ((rate / self.tick_rate) / k as f64).clamp(0.0, 0.5);
        let shape = LfoWaveform::from(self.waveform);

        for i in 0..k {
            self.phase = wrap_phase(self.phase + increment);
            self.ring.write(i, waveform::bipolar(shape, self.phase));
        }

        self.last_output = (self.ring.mean() * depth).clamp(-1.0, 1.0);
        self.last_output
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rate.snap(self.rate.target());
        self.depth.snap(self.depth.target());
        self.ring.clear();
        self.last_output = 0.0;
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rate(&self) -> f32 {
        self.rate.target() as f32
    }

    pub fn depth(&self) -> f32 {
        self.depth.target() as f32
    }

    pub fn waveform(&self) -> ShaperWaveform {
        self.waveform
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn oversampling_factor(&self) -> usize {
        self.ring.factor()
    }
}
