//! Stereo carrier: applies the tremolo gain to host audio.
//!
//! Per block the engine drains pending parameter changes, reads the host
//! transport, decides whether audio is present, and then renders one gain
//! sample per frame, shared by both channels:
//!
//! ```text
//! out = in · (1 - mix) + g · highpass(in) · mix
//! ```

pub mod control;

use crate::dsp::filter::SVFilter;
use crate::dsp::mix::{blend_dry_wet, is_audible};
use crate::dsp::smoother::{Smoother, DEPTH_SMOOTHING_SECONDS};
use crate::dsp::tremolo::{LfoState, TremoloLfo};
use crate::error::{validate_f32, ErrorSlot, TremoloError, TremoloResult};
use crate::params::TremoloParams;
use crate::MAX_BLOCK_SIZE;

use self::control::{ParamChange, ParamReceiver};

/// What the host reports about playback for the current block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transport {
    pub is_playing: bool,
    /// Host tempo, if the host provides one.
    pub bpm: Option<f64>,
    /// Position in quarter-note beats, if known.
    pub beat_position: Option<f64>,
}

impl Transport {
    /// Playing with no tempo information.
    pub const fn playing() -> Self {
        Self {
            is_playing: true,
            bpm: None,
            beat_position: None,
        }
    }

    pub const fn stopped() -> Self {
        Self {
            is_playing: false,
            bpm: None,
            beat_position: None,
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn with_beat_position(mut self, beat: f64) -> Self {
        self.beat_position = Some(beat);
        self
    }
}

pub struct TremoloEngine {
    lfo: TremoloLfo,
    filters: [SVFilter; 2],
    mix: Smoother,
    bypass: bool,
    sample_rate: f64,
    host_bpm: Option<f64>,
    gains: Vec<f32>,
    mixes: Vec<f32>,
    rendered: usize,
    receiver: Option<Box<dyn ParamReceiver + Send>>,
    errors: ErrorSlot,
}

impl TremoloEngine {
    pub fn new(sample_rate: f64) -> Self {
        let lfo = TremoloLfo::new(sample_rate);
        let sample_rate = lfo.sample_rate();

        let mut filters = [SVFilter::dc_blocker(), SVFilter::dc_blocker()];
        for filter in &mut filters {
            filter.prepare(sample_rate);
        }

        Self {
            lfo,
            filters,
            mix: Smoother::new(1.0, DEPTH_SMOOTHING_SECONDS, sample_rate),
            bypass: false,
            sample_rate,
            host_bpm: None,
            gains: vec![0.0; MAX_BLOCK_SIZE],
            mixes: vec![0.0; MAX_BLOCK_SIZE],
            rendered: 0,
            receiver: None,
            errors: ErrorSlot::new(),
        }
    }

    /// Start from `params` with no smoothing.
    pub fn with_params(mut self, params: &TremoloParams) -> Self {
        let _ = self.apply_params(params);
        self.lfo.settle();
        self.mix.snap(self.mix.target());
        self
    }

    /// Take parameter changes from `receiver` at every block start.
    pub fn with_receiver(mut self, receiver: impl ParamReceiver + Send + 'static) -> Self {
        self.receiver = Some(Box::new(receiver));
        self
    }

    /// Configure for a new stream. Resets the LFO and filter state.
    pub fn prepare(&mut self, sample_rate: f64) -> TremoloResult<()> {
        let result = self.lfo.prepare(sample_rate);
        self.sample_rate = self.lfo.sample_rate();

        match result {
            Ok(()) => log::info!("tremolo prepared at {} Hz", self.sample_rate),
            Err(err) => log::warn!("{err}; running at {} Hz", self.sample_rate),
        }

        for filter in &mut self.filters {
            filter.prepare(self.sample_rate);
        }
        self.mix.set_sample_rate(self.sample_rate);
        self.host_bpm = None;
        self.rendered = 0;

        self.errors.record(result)
    }

    /// Apply a whole snapshot through the smoothed setters.
    pub fn apply_params(&mut self, params: &TremoloParams) -> TremoloResult<()> {
        let lfo = &mut self.lfo;
        let shaper = params.waveshaper;
        let results = [
            lfo.set_rate(params.rate),
            lfo.set_depth(params.depth),
            lfo.set_phase_offset(params.phase_offset),
            lfo.set_bpm(params.bpm),
            lfo.set_sync(params.sync, params.division.multiplier()),
            lfo.set_waveshape(shaper.rate, shaper.depth, shaper.waveform, shaper.enabled),
        ];
        lfo.set_waveform(params.waveform);

        let mix = self.set_mix(params.mix);
        self.set_bypass(params.bypass);

        results.into_iter().fold(mix, |acc, r| acc.and(r))
    }

    pub fn set_mix(&mut self, mix: f32) -> TremoloResult<()> {
        let current = self.mix.target() as f32;
        let (mix, result) = validate_f32(mix, 0.0, 1.0, current, TremoloError::InvalidDepth);
        self.mix.set_target(mix as f64);
        self.errors.record(result)
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    pub fn mix(&self) -> f32 {
        self.mix.target() as f32
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn lfo(&self) -> &TremoloLfo {
        &self.lfo
    }

    pub fn lfo_mut(&mut self) -> &mut TremoloLfo {
        &mut self.lfo
    }

    /// Most recent error from the engine or its LFO.
    pub fn last_error(&self) -> Option<TremoloError> {
        self.errors.get().or_else(|| self.lfo.last_error())
    }

    pub fn clear_error(&mut self) {
        self.errors.clear();
        self.lfo.clear_error();
    }

    /// Gain samples of the last rendered chunk.
    pub fn gain_trace(&self) -> &[f32] {
        &self.gains[..self.rendered]
    }

    fn apply_change(&mut self, change: ParamChange) {
        // already validated on the control side; results stay sticky
        let _ = match change {
            ParamChange::Rate(hz) => self.lfo.set_rate(hz),
            ParamChange::Depth(depth) => self.lfo.set_depth(depth),
            ParamChange::Mix(mix) => self.set_mix(mix),
            ParamChange::Waveform(waveform) => {
                self.lfo.set_waveform(waveform);
                Ok(())
            }
            ParamChange::PhaseOffset(degrees) => self.lfo.set_phase_offset(degrees),
            ParamChange::Bpm(bpm) => self.lfo.set_bpm(bpm),
            ParamChange::Sync { on, division } => self.lfo.set_sync(on, division),
            ParamChange::Waveshape {
                rate,
                depth,
                waveform,
                enabled,
            } => self.lfo.set_waveshape(rate, depth, waveform, enabled),
            ParamChange::Bypass(bypass) => {
                self.set_bypass(bypass);
                Ok(())
            }
            ParamChange::ResetPhase => {
                self.lfo.reset_phase();
                Ok(())
            }
        };
    }

    fn drain_changes(&mut self) {
        while let Some(change) = self.receiver.as_mut().and_then(|rx| rx.pop()) {
            self.apply_change(change);
        }
    }

    fn update_transport(&mut self, transport: &Transport, audio_active: bool) {
        // hosts without a tempo sometimes report NaN
        if let Some(bpm) = transport.bpm.filter(|bpm| bpm.is_finite()) {
            if self.host_bpm != Some(bpm) {
                self.host_bpm = Some(bpm);
                let _ = self.lfo.set_bpm(bpm);
            }
        }

        let was_idle = self.lfo.state() == LfoState::Idle;
        self.lfo.update_active(audio_active, transport.is_playing);

        if was_idle && self.lfo.state() == LfoState::Running {
            if let Some(beat) = transport.beat_position {
                self.lfo.align_to_host_beat(beat);
            }
        }
    }

    /// Process a stereo block in place.
    ///
    /// Slices should have equal length; extra samples in the longer one are
    /// left untouched.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], transport: Transport) {
        self.drain_changes();

        let len = left.len().min(right.len());
        let (left, right) = (&mut left[..len], &mut right[..len]);

        let audio_active = is_audible(left) || is_audible(right);
        self.update_transport(&transport, audio_active);

        if self.bypass {
            self.rendered = 0;
            return;
        }

        for (l, r) in left
            .chunks_mut(MAX_BLOCK_SIZE)
            .zip(right.chunks_mut(MAX_BLOCK_SIZE))
        {
            let n = l.len();
            self.render_modulation(n);

            let (gains, mixes) = (&self.gains[..n], &self.mixes[..n]);
            apply_tremolo(&mut self.filters[0], l, gains, mixes);
            apply_tremolo(&mut self.filters[1], r, gains, mixes);
        }
    }

    /// Process a mono block in place.
    pub fn process_mono(&mut self, buffer: &mut [f32], transport: Transport) {
        self.drain_changes();

        let audio_active = is_audible(buffer);
        self.update_transport(&transport, audio_active);

        if self.bypass {
            self.rendered = 0;
            return;
        }

        for chunk in buffer.chunks_mut(MAX_BLOCK_SIZE) {
            let n = chunk.len();
            self.render_modulation(n);
            apply_tremolo(
                &mut self.filters[0],
                chunk,
                &self.gains[..n],
                &self.mixes[..n],
            );
        }
    }

    fn render_modulation(&mut self, n: usize) {
        self.lfo.render(&mut self.gains[..n]);
        for m in &mut self.mixes[..n] {
            *m = self.mix.next() as f32;
        }
        self.rendered = n;
    }
}

#[inline]
fn apply_tremolo(filter: &mut SVFilter, buffer: &mut [f32], gains: &[f32], mixes: &[f32]) {
    for ((sample, &g), &mix) in buffer.iter_mut().zip(gains).zip(mixes) {
        let dry = *sample;
        let wet = g * filter.process(dry);
        *sample = blend_dry_wet(dry, wet, mix);
    }
}
