//! Low Frequency Oscillator (LFO) concepts and small conversions.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. The waveform math
is the same as an audible oscillator; what changes is the job. A tremolo
LFO does not make sound, it moves the volume of a sound.

Vocabulary
----------

  control-rate    Frequencies below human pitch perception: ~0.01 Hz to
                  ~25 Hz. Fast enough to feel rhythmic, slow enough that
                  we hear "wobble" rather than a tone.

  period          Time for one complete oscillation.
                  At 5 Hz: period = 1/5 = 0.2 seconds = 200ms

  bipolar         Output swings positive AND negative: -1.0 to +1.0.
                  Handy for ADDING two modulators, since they can push
                  each other both ways.

  unipolar        Output is only positive: 0.0 to 1.0.
                  What a gain wants: 0 = silent, 1 = untouched.


Typical Tremolo Rates
---------------------

    0.01 - 0.5 Hz   Slow swells, barely noticed as tremolo
    0.5  - 3 Hz     Classic amp tremolo, vintage organ
    3    - 8 Hz     Fast "surf" tremolo
    8    - 25 Hz    Stutter and "helicopter" territory

Above ~25 Hz the modulation starts producing audible sidebands (AM
synthesis) instead of a pulse, which is why the host-facing rate range
stops at 25 Hz.


Bipolar and Unipolar
--------------------

    unipolar = (bipolar + 1.0) * 0.5
    bipolar  = unipolar * 2.0 - 1.0

    bipolar   unipolar
    -1.0      0.0
     0.0      0.5
    +1.0      1.0

The tremolo evaluates its shape in unipolar form, drops into bipolar to
add the waveshaper, and comes back to unipolar before depth is applied.
*/

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

/// Calculate LFO period in seconds from frequency.
///
/// # Example
/// ```
/// use saavy_tremolo::dsp::lfo::period_from_frequency;
/// let period = period_from_frequency(5.0);
/// assert!((period - 0.2).abs() < 1e-9); // 5 Hz = 200ms period
/// ```
#[inline]
pub fn period_from_frequency(frequency_hz: f64) -> f64 {
    1.0 / frequency_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unipolar_to_bipolar() {
        assert!((unipolar_to_bipolar(0.0) - (-1.0)).abs() < 1e-6);
        assert!((unipolar_to_bipolar(0.5) - 0.0).abs() < 1e-6);
        assert!((unipolar_to_bipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_period_math() {
        assert!((period_from_frequency(2.0) - 0.5).abs() < 1e-12);
        assert!((period_from_frequency(0.01) - 100.0).abs() < 1e-9);
    }
}
