//! Error codes reported by control-rate operations.
//!
//! The audio path never fails. Setters clamp or coerce out-of-range input,
//! apply the corrected value, and report what happened through these codes.
//! The last reported code stays readable ("sticky") until cleared.

use thiserror::Error;

/// Result type for control-rate operations.
///
/// An `Err` does not mean the call was ignored: the corrected value has
/// already been applied when the error comes back.
pub type TremoloResult<T> = Result<T, TremoloError>;

/// Everything a setter can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TremoloError {
    /// Sample rate outside 8 kHz..384 kHz, or not finite.
    #[error("sample rate must be a finite value between 8000 and 384000 Hz")]
    InvalidSampleRate,

    /// Modulation rate outside 0.001..100 Hz, or not finite.
    #[error("modulation rate must be a finite value between 0.001 and 100 Hz")]
    InvalidRate,

    /// Depth outside 0..1, or not finite.
    #[error("depth must be a finite value between 0 and 1")]
    InvalidDepth,

    /// Waveform index does not name a known shape. Sine was used instead.
    #[error("unknown waveform index, falling back to sine")]
    InvalidWaveform,

    /// Tempo outside 1..999 BPM, or not finite.
    #[error("tempo must be a finite value between 1 and 999 BPM")]
    InvalidBpm,

    /// Beat multiplier outside 0.0625..16, or not finite.
    #[error("note division must be a finite value between 0.0625 and 16")]
    InvalidDivision,

    /// Phase offset was NaN or infinite.
    #[error("phase offset must be finite")]
    InvalidPhaseOffset,

    /// The oversample ring could not take the requested size.
    #[error("oversample buffer could not be resized")]
    BufferAllocationFailed,
}

/// Sticky slot for the most recent error.
///
/// Plain data, owned by whichever side performs the validation. Writing is a
/// single store, so it is fine to touch from the audio thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorSlot(Option<TremoloError>);

impl ErrorSlot {
    pub const fn new() -> Self {
        Self(None)
    }

    /// Record the outcome of a setter and hand it back unchanged.
    #[inline]
    pub fn record(&mut self, result: TremoloResult<()>) -> TremoloResult<()> {
        if let Err(err) = result {
            self.0 = Some(err);
        }
        result
    }

    pub fn get(&self) -> Option<TremoloError> {
        self.0
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Clamp `value` into `[min, max]`.
///
/// Non-finite input maps to `fallback` (which must itself be in range).
/// Returns the value to apply plus `Err(error)` whenever a correction was made.
#[inline]
pub(crate) fn validate_f64(
    value: f64,
    min: f64,
    max: f64,
    fallback: f64,
    error: TremoloError,
) -> (f64, TremoloResult<()>) {
    if !value.is_finite() {
        return (fallback, Err(error));
    }
    if value < min {
        (min, Err(error))
    } else if value > max {
        (max, Err(error))
    } else {
        (value, Ok(()))
    }
}

/// `f32` flavour of [`validate_f64`].
#[inline]
pub(crate) fn validate_f32(
    value: f32,
    min: f32,
    max: f32,
    fallback: f32,
    error: TremoloError,
) -> (f32, TremoloResult<()>) {
    let (v, result) = validate_f64(
        value as f64,
        min as f64,
        max as f64,
        fallback as f64,
        error,
    );
    (v as f32, result)
}
