//! Tempo sync: host BPM and note division to LFO frequency.

/*
Tempo Sync
==========

A synced tremolo ties its rate to the song tempo instead of a fixed Hz
value, so the pulses land on the beat no matter what the BPM is.

Vocabulary
----------

  BPM         Beats (quarter notes) per minute, reported by the host.

  division    Beat multiplier: how many LFO cycles fit in one beat.
                1.0  → one cycle per quarter note   ("1/4")
                2.0  → two cycles per quarter note  ("1/8")
                0.25 → one cycle per whole note     ("1/1")


The Math
--------

    cycles_per_minute = bpm × division
    hz                = cycles_per_minute / 60

    120 BPM, 1/4:   120 × 1.0 / 60 = 2 Hz
    120 BPM, 1/8:   120 × 2.0 / 60 = 4 Hz

Divisions faster than 1/8 (division > 2) are tapered by 0.75. At high
tempos the straight conversion runs into the "helicopter" zone where the
pulses stop sounding like tremolo; the taper keeps 1/16 and 1/32 musical:

    120 BPM, 1/16:  120 × 4.0 / 60 × 0.75 = 6 Hz

The result is always clamped to the host-facing rate range, 0.01..25 Hz.


User Divisions
--------------

  label   multiplier
  1/1     0.25
  1/2     0.5
  1/4     1.0
  1/8     2.0
  1/16    4.0
  1/32    8.0
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const MIN_BPM: f64 = 1.0;
pub const MAX_BPM: f64 = 999.0;
pub const DEFAULT_BPM: f64 = 120.0;

pub const MIN_DIVISION: f64 = 0.0625;
pub const MAX_DIVISION: f64 = 16.0;

/// Lowest frequency a synced LFO will produce.
pub const MIN_SYNCED_HZ: f64 = 0.01;
/// Highest frequency a synced LFO will produce.
pub const MAX_SYNCED_HZ: f64 = 25.0;

/// Divisions above this get the 0.75 taper.
const TAPER_THRESHOLD: f64 = 2.0;
const TAPER: f64 = 0.75;

/// Convert tempo and beat multiplier to an LFO frequency in Hz.
pub fn bpm_to_frequency(bpm: f64, division: f64) -> f64 {
    let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    let division = division.clamp(MIN_DIVISION, MAX_DIVISION);

    let cycles_per_minute = bpm * division;
    let mut hz = cycles_per_minute / 60.0;

    if division > TAPER_THRESHOLD {
        hz *= TAPER;
    }

    hz.clamp(MIN_SYNCED_HZ, MAX_SYNCED_HZ)
}

/// LFO cycles per host beat at a given tempo, taper and clamp included.
pub fn cycles_per_beat(bpm: f64, division: f64) -> f64 {
    let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    bpm_to_frequency(bpm, division) * 60.0 / bpm
}

/// Phase an LFO should sit at when the host is `beat_position` beats in.
pub fn phase_at_beat(beat_position: f64, bpm: f64, division: f64) -> f64 {
    if !beat_position.is_finite() {
        return 0.0;
    }
    let cycles = beat_position * cycles_per_beat(bpm, division);
    crate::dsp::waveform::wrap_phase(cycles)
}

/// Note divisions offered to the user.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteDivision {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl NoteDivision {
    pub const ALL: [NoteDivision; 6] = [
        NoteDivision::Whole,
        NoteDivision::Half,
        NoteDivision::Quarter,
        NoteDivision::Eighth,
        NoteDivision::Sixteenth,
        NoteDivision::ThirtySecond,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// LFO cycles per quarter-note beat.
    pub const fn multiplier(self) -> f64 {
        match self {
            NoteDivision::Whole => 0.25,
            NoteDivision::Half => 0.5,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Eighth => 2.0,
            NoteDivision::Sixteenth => 4.0,
            NoteDivision::ThirtySecond => 8.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            NoteDivision::Whole => "1/1",
            NoteDivision::Half => "1/2",
            NoteDivision::Quarter => "1/4",
            NoteDivision::Eighth => "1/8",
            NoteDivision::Sixteenth => "1/16",
            NoteDivision::ThirtySecond => "1/32",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_and_eighth_at_120() {
        assert_eq!(bpm_to_frequency(120.0, 1.0), 2.0);
        assert_eq!(bpm_to_frequency(120.0, 2.0), 4.0);
    }

    #[test]
    fn test_taper_above_eighth() {
        assert_eq!(bpm_to_frequency(120.0, 4.0), 6.0);
        // 1/32 at 120: 16 Hz straight, 12 Hz tapered
        assert_eq!(bpm_to_frequency(120.0, 8.0), 12.0);
    }

    #[test]
    fn test_result_clamped() {
        // 999 BPM × 16 / 60 × 0.75 = 199.8 Hz, clamped
        assert_eq!(bpm_to_frequency(999.0, 16.0), MAX_SYNCED_HZ);
        // 1 BPM × 0.0625 / 60 ≈ 0.001 Hz, clamped
        assert_eq!(bpm_to_frequency(1.0, 0.0625), MIN_SYNCED_HZ);
    }

    #[test]
    fn test_inputs_clamped() {
        assert_eq!(bpm_to_frequency(5000.0, 1.0), bpm_to_frequency(999.0, 1.0));
        assert_eq!(bpm_to_frequency(120.0, 100.0), bpm_to_frequency(120.0, 16.0));
    }

    #[test]
    fn test_division_multipliers() {
        let expected = [0.25, 0.5, 1.0, 2.0, 4.0, 8.0];
        for (division, &m) in NoteDivision::ALL.iter().zip(expected.iter()) {
            assert_eq!(division.multiplier(), m);
        }
        assert_eq!(NoteDivision::from_index(2), Some(NoteDivision::Quarter));
        assert_eq!(NoteDivision::from_index(6), None);
        assert_eq!(NoteDivision::Sixteenth.label(), "1/16");
    }

    #[test]
    fn test_phase_at_beat() {
        // 1/8 at 120 BPM: two cycles per beat
        assert!((phase_at_beat(0.25, 120.0, 2.0) - 0.5).abs() < 1e-12);
        assert!(phase_at_beat(3.0, 120.0, 2.0).abs() < 1e-12);
        // tapered: 1/16 → 3 cycles per beat
        assert!((cycles_per_beat(120.0, 4.0) - 3.0).abs() < 1e-12);
        assert_eq!(phase_at_beat(f64::NAN, 120.0, 1.0), 0.0);
    }
}
