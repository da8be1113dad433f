//! The tremolo LFO: per-sample gain with sync, smoothing and clean stops.

/*
Tremolo LFO
===========

The tremolo LFO produces one gain value per audio sample. Multiply the
audio by that gain and you have a tremolo.

    g ∈ [0, 1]      1.0 = untouched, 0.0 = silent

Per Sample
----------

    rate smoother ──→ phase increment ──→ K sub-steps ──→ mean ──→ depth
                                            │
                        waveform(φ + offset) + waveshaper

1. Advance the smoothers (rate, depth, phase-offset weight).
2. Step the phase K times by (rate / SR) / K, evaluating the unipolar
   waveform at φ + offset each time. If the waveshaper is running, its
   value is added in bipolar space and clamped (see dsp/waveshaper.rs).
3. Average the K sub-samples (box filter, see dsp/oversample.rs).
4. Apply depth with a gain bias:

       g = clamp(y·d + (1 - d), 0, 1)

   At d = 0 the gain is pinned at 1 (no modulation). At d = 1 the gain
   swings across the full 0..1 range. The waveshaper is combined BEFORE
   depth is applied; swapping the order changes how it sounds.


Stopping Cleanly
----------------

When the host is playing and the input goes quiet, the LFO should not
just stop where it is. A tremolo frozen at the bottom of a cycle leaves
the next note half-muted, and snapping back to rest is an audible click.
Instead the LFO finishes its current cycle, then fades to rest:

    ┌──────┐  active + playing  ┌─────────┐
    │ Idle │ ─────────────────→ │ Running │
    └──────┘                    └─────────┘
       ↑  ↑                          │ inactive + playing
       │  │                          ↓
       │  │  fade done     ┌─────────────────┐
       │  │  (φ ← 0)       │ WaitingForReset │  keeps modulating
       │  │                └─────────────────┘
       │  │                          │ φ ≥ 0.99 or φ < 0.01
       │  │                          ↓
       │  │                ┌─────────────────┐
       │  └─────────────── │ ResetTransition │  50 ms cosine fade
       │                   └─────────────────┘
       │
       └── inactive + stopped (from anywhere): immediate φ ← 0

The fade blends from a snapshot of the gain at the cycle boundary to the
rest value with a raised-cosine weight:

    w   = (1 - cos(π·t)) / 2          t: 0 → 1 over 50 ms
    out = snapshot·(1 - w) + depth·w

At rest (Idle) the LFO outputs the target depth and the phase sits at 0.


Sync
----

Synced mode derives the rate from host tempo (dsp/sync.rs). The manual
rate in effect when sync is switched on is remembered and restored
exactly when it is switched off again. Rate changes in both directions
ride the 80 ms rate smoother, so sync/free switching never jumps.


Errors
------

Setters never refuse. Out-of-range input is clamped (or an unknown
waveform becomes Sine), applied, and reported both as the return value
and through the sticky `last_error()`.
*/

use std::f64::consts::PI;

use crate::dsp::lfo::{bipolar_to_unipolar, unipolar_to_bipolar};
use crate::dsp::oversample::{factor_for, OversampleRing};
use crate::dsp::smoother::{
    Smoother, DEPTH_SMOOTHING_SECONDS, PHASE_SMOOTHING_SECONDS, RATE_SMOOTHING_SECONDS,
};
use crate::dsp::sync::{
    bpm_to_frequency, phase_at_beat, DEFAULT_BPM, MAX_BPM, MAX_DIVISION, MIN_BPM, MIN_DIVISION,
};
use crate::dsp::waveform::{unipolar_cached, wrap_phase, LfoWaveform, ShaperWaveform, SmoothRandomCache};
use crate::dsp::waveshaper::WaveshaperLfo;
use crate::error::{validate_f32, validate_f64, ErrorSlot, TremoloError, TremoloResult};
use crate::{DEFAULT_SAMPLE_RATE, MAX_RATE, MAX_SAMPLE_RATE, MIN_RATE, MIN_SAMPLE_RATE};

/// Length of the fade from the last cycle to rest.
pub const RESET_TRANSITION_SECONDS: f64 = 0.05;

/// Phase window around the cycle boundary that starts the fade.
const BOUNDARY_HIGH: f64 = 0.99;
const BOUNDARY_LOW: f64 = 0.01;

pub const DEFAULT_RATE: f32 = 5.0;
pub const DEFAULT_DEPTH: f32 = 0.5;

/// Where the LFO is in its activation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoState {
    /// Not modulating. Output is the target depth, phase is 0.
    Idle,
    /// Modulating normally.
    Running,
    /// Deactivated while playing; finishing the current cycle.
    WaitingForReset,
    /// Fading from the last cycle to rest.
    ResetTransition,
}

#[derive(Debug, Clone)]
pub struct TremoloLfo {
    // oscillator
    phase: f64,
    sample_rate: f64,
    rate: f32,
    depth: f32,
    waveform: LfoWaveform,
    offset_from: f64,
    offset_to: f64,
    last_output: f32,

    // sync
    synced: bool,
    bpm: f64,
    division: f64,
    last_manual_rate: f32,

    // smoothing
    rate_smoother: Smoother,
    depth_smoother: Smoother,
    offset_weight: Smoother,

    // reset / transition record
    was_active: bool,
    waiting_for_reset: bool,
    in_reset_transition: bool,
    reset_transition_phase: f64,
    reset_increment: f64,

    ring: OversampleRing,
    cache: SmoothRandomCache,
    shaper: WaveshaperLfo,
    errors: ErrorSlot,
}

impl TremoloLfo {
    /// Create an idle LFO. Out-of-range sample rates are clamped.
    pub fn new(sample_rate: f64) -> Self {
        let (sample_rate, _) = validate_f64(
            sample_rate,
            MIN_SAMPLE_RATE,
            MAX_SAMPLE_RATE,
            DEFAULT_SAMPLE_RATE,
            TremoloError::InvalidSampleRate,
        );

        let mut lfo = Self {
            phase: 0.0,
            sample_rate,
            rate: DEFAULT_RATE,
            depth: DEFAULT_DEPTH,
            waveform: LfoWaveform::Sine,
            offset_from: 0.0,
            offset_to: 0.0,
            last_output: DEFAULT_DEPTH,

            synced: false,
            bpm: DEFAULT_BPM,
            division: 1.0,
            last_manual_rate: DEFAULT_RATE,

            rate_smoother: Smoother::new(DEFAULT_RATE as f64, RATE_SMOOTHING_SECONDS, sample_rate),
            depth_smoother: Smoother::new(
                DEFAULT_DEPTH as f64,
                DEPTH_SMOOTHING_SECONDS,
                sample_rate,
            ),
            offset_weight: Smoother::new(1.0, PHASE_SMOOTHING_SECONDS, sample_rate),

            was_active: false,
            waiting_for_reset: false,
            in_reset_transition: false,
            reset_transition_phase: 0.0,
            reset_increment: 1.0 / (RESET_TRANSITION_SECONDS * sample_rate),

            ring: OversampleRing::new(),
            cache: SmoothRandomCache::new(),
            shaper: WaveshaperLfo::new(sample_rate),
            errors: ErrorSlot::new(),
        };
        lfo.update_oversampling();
        lfo
    }

    // ----------------------------------------------------------------------
    // Builders. Values are applied immediately, without smoothing.
    // ----------------------------------------------------------------------

    pub fn with_rate(mut self, hz: f32) -> Self {
        let _ = self.set_rate(hz);
        self.settle();
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        let _ = self.set_depth(depth);
        self.settle();
        self
    }

    pub fn with_waveform(mut self, waveform: LfoWaveform) -> Self {
        self.set_waveform(waveform);
        self
    }

    pub fn with_phase_offset(mut self, degrees: f64) -> Self {
        let _ = self.set_phase_offset(degrees);
        self.settle();
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        let _ = self.set_bpm(bpm);
        self.settle();
        self
    }

    pub fn with_sync(mut self, division: f64) -> Self {
        let _ = self.set_sync(true, division);
        self.settle();
        self
    }

    /// Jump every smoother to its target.
    pub fn settle(&mut self) {
        self.rate_smoother.snap(self.rate_smoother.target());
        self.depth_smoother.snap(self.depth_smoother.target());
        self.offset_weight.snap(1.0);
        self.offset_from = self.offset_to;
    }

    // ----------------------------------------------------------------------
    // Control-rate setters
    // ----------------------------------------------------------------------

    /// Configure for a new stream and return to rest.
    pub fn prepare(&mut self, sample_rate: f64) -> TremoloResult<()> {
        let result = self.set_sample_rate(sample_rate);
        self.reset();
        result
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> TremoloResult<()> {
        let (sample_rate, result) = validate_f64(
            sample_rate,
            MIN_SAMPLE_RATE,
            MAX_SAMPLE_RATE,
            self.sample_rate,
            TremoloError::InvalidSampleRate,
        );

        self.sample_rate = sample_rate;
        self.rate_smoother.set_sample_rate(sample_rate);
        self.depth_smoother.set_sample_rate(sample_rate);
        self.offset_weight.set_sample_rate(sample_rate);
        self.offset_from = self.offset_to;
        self.reset_increment = 1.0 / (RESET_TRANSITION_SECONDS * sample_rate);
        self.update_oversampling();

        self.errors.record(result)
    }

    /// Manual rate in Hz. While synced this only updates the rate that
    /// comes back when sync is switched off.
    pub fn set_rate(&mut self, hz: f32) -> TremoloResult<()> {
        let (hz, result) = validate_f32(hz, MIN_RATE, MAX_RATE, self.rate, TremoloError::InvalidRate);

        self.rate = hz;
        if self.synced {
            self.last_manual_rate = hz;
        }
        self.retarget_rate();

        self.errors.record(result)
    }

    pub fn set_depth(&mut self, depth: f32) -> TremoloResult<()> {
        let (depth, result) = validate_f32(depth, 0.0, 1.0, self.depth, TremoloError::InvalidDepth);

        self.depth = depth;
        self.depth_smoother.set_target(depth as f64);

        self.errors.record(result)
    }

    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        if waveform == self.waveform {
            return;
        }
        if waveform.is_one_shot() || self.waveform.is_one_shot() {
            self.phase = 0.0;
        }
        self.waveform = waveform;
        self.cache.invalidate();
    }

    /// Select a waveform by host index. Unknown indices become Sine.
    pub fn set_waveform_index(&mut self, index: usize) -> TremoloResult<()> {
        let (waveform, result) = match LfoWaveform::from_index(index) {
            Some(waveform) => (waveform, Ok(())),
            None => (LfoWaveform::Sine, Err(TremoloError::InvalidWaveform)),
        };
        self.set_waveform(waveform);
        self.errors.record(result)
    }

    /// Phase offset in degrees, clamped to ±360.
    ///
    /// The change is interpolated over 30 ms.
    pub fn set_phase_offset(&mut self, degrees: f64) -> TremoloResult<()> {
        if !degrees.is_finite() {
            return self.errors.record(Err(TremoloError::InvalidPhaseOffset));
        }
        let cycles = degrees.clamp(-360.0, 360.0) / 360.0;
        if cycles == self.offset_to {
            return Ok(());
        }

        self.offset_from = self.current_offset();
        self.offset_to = cycles;
        self.offset_weight.snap(0.0);
        self.offset_weight.set_target(1.0);
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: f64) -> TremoloResult<()> {
        let (bpm, result) = validate_f64(bpm, MIN_BPM, MAX_BPM, self.bpm, TremoloError::InvalidBpm);

        self.bpm = bpm;
        if self.synced {
            self.retarget_rate();
        }

        self.errors.record(result)
    }

    /// Switch tempo sync on or off. `division` is the beat multiplier.
    pub fn set_sync(&mut self, on: bool, division: f64) -> TremoloResult<()> {
        let (division, result) = validate_f64(
            division,
            MIN_DIVISION,
            MAX_DIVISION,
            self.division,
            TremoloError::InvalidDivision,
        );
        self.division = division;

        if on && !self.synced {
            self.last_manual_rate = self.rate;
        } else if !on && self.synced {
            self.rate = self.last_manual_rate;
        }
        self.synced = on;
        self.retarget_rate();

        self.errors.record(result)
    }

    pub fn set_waveshape(
        &mut self,
        rate: f32,
        depth: f32,
        waveform: ShaperWaveform,
        enabled: bool,
    ) -> TremoloResult<()> {
        let result = self.shaper.set_parameters(rate, depth, waveform, enabled);
        self.errors.record(result)
    }

    /// Report host transport and input presence.
    pub fn update_active(&mut self, audio_active: bool, is_playing: bool) {
        let deactivated = self.was_active && !audio_active;

        if !is_playing {
            if deactivated {
                self.phase = 0.0;
            }
            self.waiting_for_reset = false;
            self.in_reset_transition = false;
        } else if deactivated {
            self.waiting_for_reset = true;
        } else if audio_active {
            self.waiting_for_reset = false;
            self.in_reset_transition = false;
        }

        self.was_active = audio_active;
    }

    /// Snap the phase to the host's beat grid. Only meaningful when synced.
    pub fn align_to_host_beat(&mut self, beat_position: f64) {
        if self.synced {
            self.phase = phase_at_beat(beat_position, self.bpm, self.division);
        }
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
        self.cache.invalidate();
    }

    /// Return to rest with every smoother settled.
    pub fn reset(&mut self) {
        self.reset_phase();
        self.settle();
        self.was_active = false;
        self.waiting_for_reset = false;
        self.in_reset_transition = false;
        self.reset_transition_phase = 0.0;
        self.last_output = self.depth;
        self.ring.clear();
        self.shaper.reset();
    }

    pub fn last_error(&self) -> Option<TremoloError> {
        self.errors.get()
    }

    pub fn clear_error(&mut self) {
        self.errors.clear();
    }

    fn retarget_rate(&mut self) {
        self.rate_smoother.set_target(self.effective_rate());
        self.update_oversampling();
    }

    fn update_oversampling(&mut self) {
        let k = factor_for(self.effective_rate(), self.sample_rate);
        let result = self.ring.resize(k);
        let _ = self.errors.record(result);
        self.shaper
            .set_tick_rate(self.sample_rate * self.ring.factor() as f64);
    }

    #[inline]
    fn current_offset(&self) -> f64 {
        let w = self.offset_weight.current();
        self.offset_from + (self.offset_to - self.offset_from) * w
    }

    // ----------------------------------------------------------------------
    // Audio rate
    // ----------------------------------------------------------------------

    /// Produce the next gain sample in [0, 1].
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let rate = self.rate_smoother.next();
        let depth = self.depth_smoother.next() as f32;
        self.offset_weight.next();

        if !self.was_active && !self.waiting_for_reset {
            self.last_output = self.depth;
            return self.depth;
        }

        if self.waiting_for_reset && !self.in_reset_transition {
            let phi = self.phase;
            if phi >= BOUNDARY_HIGH || phi < BOUNDARY_LOW {
                self.in_reset_transition = true;
                self.reset_transition_phase = 0.0;
                let offset = self.current_offset();
                let y = unipolar_cached(self.waveform, phi + offset, &mut self.cache);
                self.last_output = apply_depth(y, depth);
            }
        }

        if self.in_reset_transition {
            self.reset_transition_phase += self.reset_increment;
            if self.reset_transition_phase >= 1.0 {
                self.in_reset_transition = false;
                self.waiting_for_reset = false;
                self.reset_transition_phase = 0.0;
                self.phase = 0.0;
                self.last_output = self.depth;
                return self.depth;
            }
            let w = ((1.0 - (PI * self.reset_transition_phase).cos()) * 0.5) as f32;
            let blended = self.last_output * (1.0 - w) + self.depth * w;
            return blended.clamp(0.0, 1.0);
        }

        let k = self.ring.factor();
        let increment = ((rate / self.sample_rate) / k as f64).clamp(0.0, 0.5);
        let offset = self.current_offset();

        for i in 0..k {
            self.phase = wrap_phase(self.phase + increment);
            let u = unipolar_cached(self.waveform, self.phase + offset, &mut self.cache);
            let s = self.shaper.next_shaping();
            self.ring.write(i, combine_shaping(u, s));
        }

        let g = apply_depth(self.ring.mean(), depth);
        self.last_output = g;
        g
    }

    /// Fill `out` with consecutive gain samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    // ----------------------------------------------------------------------
    // Queries
    // ----------------------------------------------------------------------

    pub fn state(&self) -> LfoState {
        if self.in_reset_transition {
            LfoState::ResetTransition
        } else if self.was_active {
            LfoState::Running
        } else if self.waiting_for_reset {
            LfoState::WaitingForReset
        } else {
            LfoState::Idle
        }
    }

    /// Rate the LFO is heading toward, sync included.
    pub fn effective_rate(&self) -> f64 {
        if self.synced {
            bpm_to_frequency(self.bpm, self.division)
        } else {
            self.rate as f64
        }
    }

    /// The free-running rate, remembered across sync toggles.
    pub fn manual_rate(&self) -> f32 {
        if self.synced {
            self.last_manual_rate
        } else {
            self.rate
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn division(&self) -> f64 {
        self.division
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase offset target in cycles (-1..1).
    pub fn phase_offset(&self) -> f64 {
        self.offset_to
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn oversampling_factor(&self) -> usize {
        self.ring.factor()
    }

    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    pub fn waveshaper(&self) -> &WaveshaperLfo {
        &self.shaper
    }
}

impl Default for TremoloLfo {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

/// Depth with gain bias: d = 0 leaves the signal untouched.
#[inline]
pub fn apply_depth(y: f32, depth: f32) -> f32 {
    (y * depth + (1.0 - depth)).clamp(0.0, 1.0)
}

/// Add a bipolar shaping value to a unipolar LFO value.
#[inline]
pub fn combine_shaping(unipolar: f32, shaping: f32) -> f32 {
    if shaping == 0.0 {
        return unipolar;
    }
    let combined = (unipolar_to_bipolar(unipolar) + shaping).clamp(-1.0, 1.0);
    bipolar_to_unipolar(combined)
}
