//! Linear parameter smoothing.

/*
Parameter Smoothing
===================

Host parameters arrive at control rate: a few hundred updates per second
at best, often far fewer. Jumping a gain or rate value instantly from one
block to the next produces "zipper" noise. A smoother turns each jump into
a short ramp.

  Value
    1.0 ┐            ╭──────────  target
        │          ╱
        │        ╱      ← ramp_samples long
        │      ╱
    0.2 └─────╯                   previous value
          set_target()

We use LINEAR ramps with a fixed duration. Every retarget restarts the
ramp from wherever the value currently is, so the ramp never overshoots
and the current value moves monotonically toward the target while the
target holds still.

The math is the same as an envelope segment:

    ramp_samples = round(time_seconds * sample_rate)
    step         = (target - current) / ramp_samples

On the last step we snap to the target so float error never leaves the
value hovering a hair away from it.

Time constants used by the tremolo:

    depth                      50 ms
    rate                       80 ms
    phase-offset interpolation 30 ms
*/

/// Depth smoothing time.
pub const DEPTH_SMOOTHING_SECONDS: f64 = 0.050;
/// Rate smoothing time.
pub const RATE_SMOOTHING_SECONDS: f64 = 0.080;
/// Phase-offset interpolation time.
pub const PHASE_SMOOTHING_SECONDS: f64 = 0.030;

#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    current: f64,
    target: f64,
    step: f64,
    remaining: u32,
    ramp_samples: u32,
    time_seconds: f64,
}

impl Smoother {
    pub fn new(value: f64, time_seconds: f64, sample_rate: f64) -> Self {
        let mut smoother = Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
            ramp_samples: 0,
            time_seconds: time_seconds.max(0.0),
        };
        smoother.set_sample_rate(sample_rate);
        smoother
    }

    /// Recompute the ramp length for a new sample rate and settle on the
    /// current target.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.ramp_samples = (self.time_seconds * sample_rate).round().max(0.0) as u32;
        self.snap(self.target);
    }

    /// Change the sample rate without disturbing a ramp in flight.
    ///
    /// The current value is kept and the rest of the ramp is stretched to
    /// cover the same remaining time at the new rate.
    pub fn rescale(&mut self, sample_rate: f64) {
        let ramp_samples = (self.time_seconds * sample_rate).round().max(0.0) as u32;
        if self.remaining > 0 && self.ramp_samples > 0 {
            let left = self.remaining as f64 / self.ramp_samples as f64;
            let remaining = (left * ramp_samples as f64).round() as u32;
            if remaining == 0 {
                self.snap(self.target);
            } else {
                self.remaining = remaining;
                self.step = (self.target - self.current) / remaining as f64;
            }
        }
        self.ramp_samples = ramp_samples;
    }

    /// Start a ramp toward `target`.
    pub fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_samples == 0 {
            self.snap(target);
            return;
        }
        self.remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f64;
    }

    /// Jump straight to `value` with no ramp.
    pub fn snap(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Advance one sample and return the smoothed value.
    #[inline]
    pub fn next(&mut self) -> f64 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }

    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaches_target_in_ramp_time() {
        let mut s = Smoother::new(0.0, DEPTH_SMOOTHING_SECONDS, 48_000.0);
        assert_eq!(s.ramp_samples(), 2400);

        s.set_target(1.0);
        for _ in 0..2399 {
            s.next();
        }
        assert!(s.is_smoothing());
        assert_eq!(s.next(), 1.0);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn test_monotonic_approach() {
        let mut s = Smoother::new(5.0, RATE_SMOOTHING_SECONDS, 44_100.0);
        s.set_target(2.0);

        let mut previous = s.current();
        for _ in 0..5000 {
            let v = s.next();
            assert!(v <= previous, "ramp went back up: {} after {}", v, previous);
            assert!(v >= 2.0);
            previous = v;
        }
        assert_eq!(previous, 2.0);
    }

    #[test]
    fn test_retarget_midway_starts_from_current() {
        let mut s = Smoother::new(0.0, 0.01, 1000.0); // 10 samples
        s.set_target(1.0);
        for _ in 0..5 {
            s.next();
        }
        let halfway = s.current();
        assert!((halfway - 0.5).abs() < 1e-9);

        s.set_target(0.0);
        let next = s.next();
        assert!(next < halfway);
        assert!((next - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_sample_rate_change_settles() {
        let mut s = Smoother::new(0.0, PHASE_SMOOTHING_SECONDS, 44_100.0);
        s.set_target(1.0);
        s.next();
        s.set_sample_rate(96_000.0);
        assert_eq!(s.current(), 1.0);
        assert_eq!(s.ramp_samples(), 2880);
    }

    #[test]
    fn test_rescale_keeps_ramp_in_flight() {
        // 50 ms ramp: 50 samples at 1 kHz
        let mut s = Smoother::new(0.0, 0.05, 1_000.0);
        s.set_target(1.0);
        for _ in 0..10 {
            s.next();
        }
        let before = s.current();
        assert!((before - 0.2).abs() < 1e-9);

        // 40 of 50 samples left become 80 of 100
        s.rescale(2_000.0);
        assert_eq!(s.current(), before);
        assert_eq!(s.ramp_samples(), 100);
        assert!(s.is_smoothing());

        let first = s.next();
        assert!((first - 0.21).abs() < 1e-9, "jumped to {}", first);
        for _ in 0..78 {
            s.next();
        }
        assert!(s.is_smoothing());
        assert_eq!(s.next(), 1.0);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn test_rescale_when_settled() {
        let mut s = Smoother::new(0.3, 0.05, 48_000.0);
        s.rescale(96_000.0);
        assert_eq!(s.current(), 0.3);
        assert_eq!(s.ramp_samples(), 4_800);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn test_zero_time_is_instant() {
        let mut s = Smoother::new(0.0, 0.0, 48_000.0);
        s.set_target(0.7);
        assert_eq!(s.current(), 0.7);
        assert_eq!(s.next(), 0.7);
    }
}
