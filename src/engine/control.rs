//! Parameter changes from the control thread to the audio thread.
//!
//! The control side validates, logs and pushes `ParamChange` values into a
//! lock-free ring; the engine drains the ring at the start of every block.
//! Nothing here blocks or allocates once the channel exists.

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "rtrb")]
use thiserror::Error;

use crate::dsp::waveform::{LfoWaveform, ShaperWaveform};
#[cfg(feature = "rtrb")]
use crate::{
    dsp::sync::{NoteDivision, MAX_BPM, MIN_BPM},
    error::{validate_f32, validate_f64, ErrorSlot, TremoloError},
    params::{normalized_to_rate, TremoloParams, MAX_PHASE_OFFSET, MIN_PHASE_OFFSET},
    MAX_RATE, MIN_RATE,
};

/// One parameter write, applied at the next block start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParamChange {
    Rate(f32),
    Depth(f32),
    Mix(f32),
    Waveform(LfoWaveform),
    PhaseOffset(f64),
    Bpm(f64),
    Sync {
        on: bool,
        division: f64,
    },
    Waveshape {
        rate: f32,
        depth: f32,
        waveform: ShaperWaveform,
        enabled: bool,
    },
    Bypass(bool),
    ResetPhase,
}

/// Audio-side source of parameter changes.
pub trait ParamReceiver {
    fn pop(&mut self) -> Option<ParamChange>;
}

#[cfg(feature = "rtrb")]
impl ParamReceiver for Consumer<ParamChange> {
    fn pop(&mut self) -> Option<ParamChange> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    /// The value was corrected and the corrected value was sent.
    #[error(transparent)]
    Invalid(#[from] TremoloError),

    /// The audio thread is not draining fast enough; the change was dropped.
    #[error("parameter queue is full")]
    QueueFull,
}

/// Create a connected control handle and audio-side receiver.
#[cfg(feature = "rtrb")]
pub fn channel(capacity: usize) -> (ControlHandle, Consumer<ParamChange>) {
    let (tx, rx) = RingBuffer::new(capacity.max(1));
    (ControlHandle::new(tx), rx)
}

/// Control-thread end of the parameter channel.
///
/// Keeps a mirror of the last values sent so the UI can read them back and
/// non-finite input can fall back to the current value.
#[cfg(feature = "rtrb")]
pub struct ControlHandle {
    tx: Producer<ParamChange>,
    params: TremoloParams,
    errors: ErrorSlot,
}

#[cfg(feature = "rtrb")]
impl ControlHandle {
    fn new(tx: Producer<ParamChange>) -> Self {
        Self {
            tx,
            params: TremoloParams::default(),
            errors: ErrorSlot::new(),
        }
    }

    /// Start from a non-default mirror, e.g. the preset the engine was
    /// built with.
    pub fn with_params(mut self, params: TremoloParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &TremoloParams {
        &self.params
    }

    pub fn last_error(&self) -> Option<TremoloError> {
        self.errors.get()
    }

    pub fn clear_error(&mut self) {
        self.errors.clear();
    }

    /// Push a change, then report the validation outcome.
    fn send(
        &mut self,
        change: ParamChange,
        validation: Result<(), TremoloError>,
    ) -> Result<(), ControlError> {
        if let Err(err) = validation {
            log::warn!("{err}; sending corrected value {change:?}");
            let _ = self.errors.record(Err(err));
        }
        self.tx.push(change).map_err(|_| {
            log::warn!("parameter queue full, dropped {change:?}");
            ControlError::QueueFull
        })?;
        validation.map_err(ControlError::from)
    }

    pub fn set_rate(&mut self, hz: f32) -> Result<(), ControlError> {
        let (hz, validation) =
            validate_f32(hz, MIN_RATE, MAX_RATE, self.params.rate, TremoloError::InvalidRate);
        self.send(ParamChange::Rate(hz), validation)?;
        self.params.rate = hz;
        Ok(())
    }

    /// Rate from a 0..1 knob position on the exponential host curve.
    pub fn set_rate_normalized(&mut self, normalized: f64) -> Result<(), ControlError> {
        self.set_rate(normalized_to_rate(normalized) as f32)
    }

    pub fn set_depth(&mut self, depth: f32) -> Result<(), ControlError> {
        let (depth, validation) =
            validate_f32(depth, 0.0, 1.0, self.params.depth, TremoloError::InvalidDepth);
        self.send(ParamChange::Depth(depth), validation)?;
        self.params.depth = depth;
        Ok(())
    }

    pub fn set_mix(&mut self, mix: f32) -> Result<(), ControlError> {
        let (mix, validation) =
            validate_f32(mix, 0.0, 1.0, self.params.mix, TremoloError::InvalidDepth);
        self.send(ParamChange::Mix(mix), validation)?;
        self.params.mix = mix;
        Ok(())
    }

    pub fn set_waveform(&mut self, waveform: LfoWaveform) -> Result<(), ControlError> {
        self.send(ParamChange::Waveform(waveform), Ok(()))?;
        self.params.waveform = waveform;
        Ok(())
    }

    /// Waveform by host index. Unknown indices send Sine.
    pub fn set_waveform_index(&mut self, index: usize) -> Result<(), ControlError> {
        let (waveform, validation) = match LfoWaveform::from_index(index) {
            Some(waveform) => (waveform, Ok(())),
            None => (LfoWaveform::Sine, Err(TremoloError::InvalidWaveform)),
        };
        self.send(ParamChange::Waveform(waveform), validation)?;
        self.params.waveform = waveform;
        Ok(())
    }

    pub fn set_phase_offset(&mut self, degrees: f64) -> Result<(), ControlError> {
        let (degrees, validation) = if degrees.is_finite() {
            (degrees.clamp(MIN_PHASE_OFFSET, MAX_PHASE_OFFSET), Ok(()))
        } else {
            (self.params.phase_offset, Err(TremoloError::InvalidPhaseOffset))
        };
        self.send(ParamChange::PhaseOffset(degrees), validation)?;
        self.params.phase_offset = degrees;
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ControlError> {
        let (bpm, validation) =
            validate_f64(bpm, MIN_BPM, MAX_BPM, self.params.bpm, TremoloError::InvalidBpm);
        self.send(ParamChange::Bpm(bpm), validation)?;
        self.params.bpm = bpm;
        Ok(())
    }

    pub fn set_sync(&mut self, on: bool, division: NoteDivision) -> Result<(), ControlError> {
        let change = ParamChange::Sync {
            on,
            division: division.multiplier(),
        };
        self.send(change, Ok(()))?;
        self.params.sync = on;
        self.params.division = division;
        Ok(())
    }

    pub fn set_waveshape(
        &mut self,
        rate: f32,
        depth: f32,
        waveform: ShaperWaveform,
        enabled: bool,
    ) -> Result<(), ControlError> {
        let current = self.params.waveshaper;
        let (rate, rate_validation) =
            validate_f32(rate, MIN_RATE, MAX_RATE, current.rate, TremoloError::InvalidRate);
        let (depth, depth_validation) =
            validate_f32(depth, 0.0, 1.0, current.depth, TremoloError::InvalidDepth);

        let change = ParamChange::Waveshape {
            rate,
            depth,
            waveform,
            enabled,
        };
        self.send(change, rate_validation.and(depth_validation))?;

        let shaper = &mut self.params.waveshaper;
        shaper.rate = rate;
        shaper.depth = depth;
        shaper.waveform = waveform;
        shaper.enabled = enabled;
        Ok(())
    }

    pub fn set_bypass(&mut self, bypass: bool) -> Result<(), ControlError> {
        self.send(ParamChange::Bypass(bypass), Ok(()))?;
        self.params.bypass = bypass;
        Ok(())
    }

    pub fn reset_phase(&mut self) -> Result<(), ControlError> {
        self.send(ParamChange::ResetPhase, Ok(()))
    }

    /// Send every field of `params`. Stops at the first full queue.
    pub fn apply(&mut self, params: &TremoloParams) -> Result<(), ControlError> {
        let mut first_invalid = Ok(());
        let mut keep = |result: Result<(), ControlError>| match result {
            Err(ControlError::QueueFull) => Err(ControlError::QueueFull),
            Err(invalid) => {
                if first_invalid.is_ok() {
                    first_invalid = Err(invalid);
                }
                Ok(())
            }
            Ok(()) => Ok(()),
        };

        keep(self.set_rate(params.rate))?;
        keep(self.set_depth(params.depth))?;
        keep(self.set_mix(params.mix))?;
        keep(self.set_waveform(params.waveform))?;
        keep(self.set_phase_offset(params.phase_offset))?;
        keep(self.set_bpm(params.bpm))?;
        keep(self.set_sync(params.sync, params.division))?;
        let shaper = params.waveshaper;
        keep(self.set_waveshape(shaper.rate, shaper.depth, shaper.waveform, shaper.enabled))?;
        keep(self.set_bypass(params.bypass))?;

        first_invalid
    }
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;

    fn drain(rx: &mut Consumer<ParamChange>) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        while let Some(change) = ParamReceiver::pop(rx) {
            changes.push(change);
        }
        changes
    }

    #[test]
    fn test_valid_change_is_forwarded() {
        let (mut handle, mut rx) = channel(8);
        handle.set_rate(3.5).unwrap();
        handle.set_depth(0.9).unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![ParamChange::Rate(3.5), ParamChange::Depth(0.9)]
        );
        assert_eq!(handle.params().rate, 3.5);
        assert_eq!(handle.last_error(), None);
    }

    #[test]
    fn test_invalid_value_sent_clamped() {
        let (mut handle, mut rx) = channel(8);
        let result = handle.set_rate(1000.0);

        assert_eq!(result, Err(ControlError::Invalid(TremoloError::InvalidRate)));
        assert_eq!(drain(&mut rx), vec![ParamChange::Rate(MAX_RATE)]);
        assert_eq!(handle.params().rate, MAX_RATE);
        assert_eq!(handle.last_error(), Some(TremoloError::InvalidRate));

        handle.clear_error();
        assert_eq!(handle.last_error(), None);
    }

    #[test]
    fn test_unknown_waveform_index_sends_sine() {
        let (mut handle, mut rx) = channel(8);
        handle.set_waveform(LfoWaveform::Square).unwrap();
        let result = handle.set_waveform_index(42);

        assert_eq!(
            result,
            Err(ControlError::Invalid(TremoloError::InvalidWaveform))
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                ParamChange::Waveform(LfoWaveform::Square),
                ParamChange::Waveform(LfoWaveform::Sine)
            ]
        );
    }

    #[test]
    fn test_full_queue_drops_change() {
        let (mut handle, mut rx) = channel(1);
        handle.set_depth(0.2).unwrap();
        assert_eq!(handle.set_depth(0.4), Err(ControlError::QueueFull));

        // mirror keeps the last value that actually went out
        assert_eq!(handle.params().depth, 0.2);
        assert_eq!(drain(&mut rx), vec![ParamChange::Depth(0.2)]);
    }

    #[test]
    fn test_sync_sends_multiplier() {
        let (mut handle, mut rx) = channel(8);
        handle.set_sync(true, NoteDivision::Sixteenth).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![ParamChange::Sync {
                on: true,
                division: 4.0
            }]
        );
    }

    #[test]
    fn test_normalized_rate() {
        let (mut handle, mut rx) = channel(8);
        handle.set_rate_normalized(1.0).unwrap();
        match drain(&mut rx).as_slice() {
            [ParamChange::Rate(hz)] => assert!((hz - 25.0).abs() < 1e-4),
            other => panic!("unexpected changes {:?}", other),
        }
    }

    #[test]
    fn test_apply_sends_everything() {
        let (mut handle, mut rx) = channel(32);
        let params = TremoloParams {
            depth: 0.75,
            ..TremoloParams::default()
        };
        handle.apply(&params).unwrap();
        assert_eq!(drain(&mut rx).len(), 9);
        assert_eq!(*handle.params(), params);
    }
}
