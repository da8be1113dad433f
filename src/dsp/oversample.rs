//! Box-filter oversampling for modulation signals.

/*
Oversampling the LFO
====================

A hard-edged LFO shape (square, saw) changes value instantly. Sampled once
per audio sample, that edge lands wherever the sample grid happens to put
it, which smears the edge timing by up to one sample and folds the edge's
harmonics back down (aliasing). For a tremolo that means a faint rough
"tick" on every edge at fast rates.

The fix used here is deliberately cheap: evaluate the shape K times inside
each audio sample and average the results.

    audio sample n            audio sample n+1
    |───────────────────────|───────────────────────|
    ·     ·     ·     ·       ← K = 4 sub-samples
    └──── mean ────┘

The mean is a K-tap box filter. An edge falling between sub-samples comes
out as an intermediate value instead of a full jump, which is exactly the
anti-aliasing we want.

Choosing K
----------

K grows with the modulation rate relative to the sample rate:

    rate > 0.10 · SR   →  K = 16
    rate > 0.05 · SR   →  K = 8
    rate > 0.01 · SR   →  K = 4
    otherwise          →  K = 2

Realtime Safety
---------------

The ring is a fixed [f32; 16]. Changing K only changes how much of it is
used, so nothing ever allocates once the LFO exists.
*/

use crate::error::{TremoloError, TremoloResult};

/// Largest supported oversampling factor.
pub const MAX_OVERSAMPLING: usize = 16;

/// Smallest oversampling factor, also the fallback.
pub const MIN_OVERSAMPLING: usize = 2;

/// Pick K for a modulation `rate` at `sample_rate`.
#[inline]
pub fn factor_for(rate: f64, sample_rate: f64) -> usize {
    if rate > 0.1 * sample_rate {
        16
    } else if rate > 0.05 * sample_rate {
        8
    } else if rate > 0.01 * sample_rate {
        4
    } else {
        2
    }
}

/// Fixed-capacity scratch for K sub-samples.
#[derive(Debug, Clone)]
pub struct OversampleRing {
    slots: [f32; MAX_OVERSAMPLING],
    factor: usize,
}

impl OversampleRing {
    pub fn new() -> Self {
        Self {
            slots: [0.0; MAX_OVERSAMPLING],
            factor: MIN_OVERSAMPLING,
        }
    }

    /// Change the logical size.
    ///
    /// Only the powers of two from 2 to 16 fit the ring. Anything else
    /// falls back to K = 2 and reports `BufferAllocationFailed`.
    pub fn resize(&mut self, factor: usize) -> TremoloResult<()> {
        if factor.is_power_of_two() && (MIN_OVERSAMPLING..=MAX_OVERSAMPLING).contains(&factor) {
            self.factor = factor;
            Ok(())
        } else {
            self.factor = MIN_OVERSAMPLING;
            Err(TremoloError::BufferAllocationFailed)
        }
    }

    #[inline]
    pub fn factor(&self) -> usize {
        self.factor
    }

    #[inline]
    pub fn write(&mut self, index: usize, value: f32) {
        self.slots[index & (MAX_OVERSAMPLING - 1)] = value;
    }

    /// Mean of the first K slots.
    #[inline]
    pub fn mean(&self) -> f32 {
        let used = &self.slots[..self.factor];
        used.iter().sum::<f32>() / self.factor as f32
    }

    pub fn clear(&mut self) {
        self.slots = [0.0; MAX_OVERSAMPLING];
    }
}

impl Default for OversampleRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_thresholds() {
        let sr = 10_000.0;
        assert_eq!(factor_for(5.0, sr), 2);
        assert_eq!(factor_for(100.0, sr), 2); // exactly 0.01·SR is not "above"
        assert_eq!(factor_for(101.0, sr), 4);
        assert_eq!(factor_for(501.0, sr), 8);
        assert_eq!(factor_for(1001.0, sr), 16);
    }

    #[test]
    fn test_typical_lfo_rates_use_minimum() {
        for &sr in &[8_000.0, 44_100.0, 48_000.0, 384_000.0] {
            assert_eq!(factor_for(25.0, sr), 2);
        }
    }

    #[test]
    fn test_mean_uses_logical_size() {
        let mut ring = OversampleRing::new();
        ring.resize(4).unwrap();
        for (i, v) in [1.0, 0.0, 1.0, 0.0].iter().enumerate() {
            ring.write(i, *v);
        }
        // stale slots past K must not count
        ring.write(4, 100.0);
        assert!((ring.mean() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_resize_falls_back() {
        let mut ring = OversampleRing::new();
        ring.resize(8).unwrap();

        assert_eq!(ring.resize(3), Err(TremoloError::BufferAllocationFailed));
        assert_eq!(ring.factor(), MIN_OVERSAMPLING);

        assert_eq!(ring.resize(32), Err(TremoloError::BufferAllocationFailed));
        assert_eq!(ring.factor(), MIN_OVERSAMPLING);
    }
}
