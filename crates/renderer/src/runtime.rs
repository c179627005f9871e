//! Time sampling for the frame drivers.
//!
//! The frame path never reads the clock directly; it asks a [`TimeSource`]
//! for the next [`TimeSample`], so tests and tooling can inject a fixed
//! timeline without touching the scheduling primitive underneath.

use std::time::Instant;

/// One sampled point on the animation timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed milliseconds since the source was (re)started. The motion
    /// field consumes this directly; the shader uniform is `millis * 0.001`.
    pub millis: f64,
    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(millis: f64, frame_index: u64) -> Self {
        Self {
            millis,
            frame_index,
        }
    }

    /// Elapsed time in seconds, as uploaded to the scene uniform block.
    pub fn seconds(&self) -> f32 {
        (self.millis * 0.001) as f32
    }
}

pub trait TimeSource {
    /// Restarts the timeline at zero.
    fn reset(&mut self);
    /// Samples the timeline and advances the frame counter.
    fn sample(&mut self) -> TimeSample;
}

/// Wall-clock time source backed by a monotonic [`Instant`].
pub struct SystemTimeSource {
    started: Instant,
    frame_index: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            frame_index: 0,
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.started = Instant::now();
        self.frame_index = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(
            self.started.elapsed().as_secs_f64() * 1000.0,
            self.frame_index,
        );
        self.frame_index = self.frame_index.saturating_add(1);
        sample
    }
}

/// Frozen time source; every sample reports the same instant.
pub struct FixedTimeSource {
    millis: f64,
    frame_index: u64,
}

impl FixedTimeSource {
    pub fn new(millis: f64) -> Self {
        Self {
            millis,
            frame_index: 0,
        }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame_index = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.millis, self.frame_index);
        self.frame_index = self.frame_index.saturating_add(1);
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_freezes_the_clock_but_counts_frames() {
        let mut source = FixedTimeSource::new(1500.0);
        let first = source.sample();
        let second = source.sample();
        assert_eq!(first.millis, 1500.0);
        assert_eq!(second.millis, 1500.0);
        assert_eq!(first.frame_index, 0);
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn seconds_scale_is_one_thousandth() {
        let sample = TimeSample::new(2500.0, 0);
        assert!((sample.seconds() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn system_source_is_monotonic() {
        let mut source = SystemTimeSource::new();
        let first = source.sample();
        let second = source.sample();
        assert!(second.millis >= first.millis);
        assert_eq!(second.frame_index, first.frame_index + 1);
    }
}
