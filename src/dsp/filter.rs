//! DC-blocking high-pass for the carrier signal.

/*
DC Blocking
===========

Before the tremolo gain is applied, the carrier passes through a gentle
high-pass at 20 Hz. Any DC offset in the input would otherwise be
modulated along with the audio, turning a silent offset into an audible
thump at the LFO rate.

The filter is a topology-preserving-transform (TPT) state-variable
filter. One structure computes all the classic responses at once:

    | output     | passes          | rejects      |
    | ---------- | --------------- | ------------ |
    | low-pass   | below cutoff    | above cutoff |
    | band-pass  | around cutoff   | elsewhere    |
    | high-pass  | above cutoff    | below cutoff |

and they always sum back to the input:

    input = low + k·band + high

Coefficients
------------

    g = tan(π · fc / fs)        prewarped integrator gain
    k = 1 / Q                   damping

Butterworth damping (Q = 1/√2, so k = √2) gives a maximally flat passband,
which is what a DC blocker wants: no bump, no droop above 20 Hz.

g and k are computed once in `prepare`; per-sample work is a handful of
multiply-adds and two state updates.
*/

use std::f64::consts::{PI, SQRT_2};

/// Cutoff of the carrier DC blocker.
pub const DC_CUTOFF_HZ: f64 = 20.0;

/// Simultaneous responses of one SVF step.
#[derive(Debug, Clone, Copy)]
pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f64,
    g: f32,
    k: f32,
}

impl SVFilter {
    /// Butterworth high-pass at `cutoff_hz`. Call `prepare` before use.
    pub fn highpass(cutoff_hz: f64) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            g: 0.0,
            k: SQRT_2 as f32,
        }
    }

    /// 20 Hz DC blocker.
    pub fn dc_blocker() -> Self {
        Self::highpass(DC_CUTOFF_HZ)
    }

    /// Compute coefficients for `sample_rate` and clear the state.
    pub fn prepare(&mut self, sample_rate: f64) {
        // keep the cutoff below Nyquist so tan() stays finite
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        self.g = (PI * cutoff / sample_rate).tan() as f32;
        self.reset();
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let g = self.g;
        let k = self.k;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// High-pass one sample.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.next_sample(sample).highpass
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }
}
