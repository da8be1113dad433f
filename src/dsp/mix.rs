//! Gain, dry/wet blending and level helpers for the carrier.

/*
Applying the Tremolo
====================

The LFO hands the carrier one gain value per sample. Applying it is plain
multiplication followed by a dry/wet blend:

    wet = g × highpass(x)
    out = x × (1 - mix) + wet × mix

Vocabulary
----------

  gain          A multiplier applied to amplitude.
                  gain = 1.0  →  unchanged (unity gain)
                  gain < 1.0  →  quieter (attenuation)
                  gain = 0.0  →  silence
                The tremolo gain is always in [0, 1], so it can only
                attenuate.

  wet/dry       Common terminology for effect mixing.
                  dry = original signal (unprocessed)
                  wet = effect signal (processed)
                A "30% wet" mix means mix = 0.3.

  peak          Largest absolute sample value in a block. Cheap, and good
                enough to decide whether anything is playing.


Linear Crossfade
----------------

    weight_dry = 1.0 - mix
    weight_wet = mix

The weights always sum to 1.0, and since |wet| ≤ |x| (the gain never
exceeds 1 and the high-pass has no passband gain), the blend can never
push the signal past its input level.


Decibels
--------

    dB = 20 × log₁₀(amplitude)

    ×1.0    =    0 dB  (unity)
    ×0.5    =   -6 dB
    ×0.01   =  -40 dB  (barely audible)
    ×1e-5   = -100 dB  (the silence threshold used for audio presence)
*/

/// Input below this level counts as silence for activation.
pub const SILENCE_THRESHOLD_DB: f32 = -100.0;

/// Blend dry and wet samples using linear crossfade (single sample version).
///
/// output = (dry × (1-mix)) + (wet × mix)
#[inline]
pub fn blend_dry_wet(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Largest absolute sample in `buffer`, 0.0 when empty.
#[inline]
pub fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

#[inline]
pub fn db_to_amplitude(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Amplitude to dB, floored at -200 dB for zero input.
#[inline]
pub fn amplitude_to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.abs().max(1e-10).log10()
}

/// True when the block is louder than the silence threshold.
#[inline]
pub fn is_audible(buffer: &[f32]) -> bool {
    peak(buffer) > db_to_amplitude(SILENCE_THRESHOLD_DB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_dry_wet() {
        // All dry
        assert_eq!(blend_dry_wet(1.0, 0.5, 0.0), 1.0);
        // All wet
        assert_eq!(blend_dry_wet(1.0, 0.5, 1.0), 0.5);
        // 50/50 mix
        assert_eq!(blend_dry_wet(1.0, 0.0, 0.5), 0.5);
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[]), 0.0);
        assert_eq!(peak(&[0.1, -0.7, 0.3]), 0.7);
    }

    #[test]
    fn test_db_conversions() {
        assert!((amplitude_to_db(1.0)).abs() < 1e-6);
        assert!((amplitude_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert!((db_to_amplitude(-100.0) - 1e-5).abs() < 1e-9);
        assert!((amplitude_to_db(0.0) + 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_silence_threshold() {
        assert!(!is_audible(&[0.0; 64]));
        assert!(!is_audible(&[5e-6, -5e-6]));
        assert!(is_audible(&[0.0, 2e-5]));
    }
}
