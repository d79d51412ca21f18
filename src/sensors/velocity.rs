// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel velocity from the rotation pickup.
//!
//! A hall sensor latches the free-running 16-bit capture counter each time a wheel magnet passes.
//! The period between two captures, corrected for counter wraparounds, gives one raw velocity
//! sample. Samples are smoothed with
//!
//! ```text
//! velocity = (1 - B) * raw + B * previous_raw
//! ```
//!
//! where `previous_raw` is the previous *raw* sample, not the previous output.
//!
//! The control tick counts ticks since the last capture; once the count exceeds the stall
//! threshold the wheel is assumed stopped and velocity reads zero until the next capture.

use log::debug;

use crate::config::{VelocityConfig, VelocityFeedback};

pub struct VelocityEstimator {
    clock_hz: f32,
    overflow_period_s: f32,
    distance_per_capture_m: f32,
    smoothing: f32,
    max_velocity: f32,
    stall_ticks: u16,
    feedback: VelocityFeedback,

    last_capture: Option<u16>,
    overflow_count: u16,
    ticks_since_capture: u16,
    stalled: bool,

    previous_raw: f32,
    raw: f32,
    filtered: f32,
}

impl VelocityEstimator {
    pub fn new(cfg: &VelocityConfig) -> Self {
        Self {
            clock_hz: cfg.capture_clock_hz,
            overflow_period_s: cfg.overflow_period_s(),
            distance_per_capture_m: cfg.distance_per_capture_m(),
            smoothing: cfg.smoothing,
            max_velocity: cfg.max_velocity,
            stall_ticks: cfg.stall_ticks,
            feedback: cfg.feedback,

            last_capture: None,
            overflow_count: 0,
            ticks_since_capture: 0,
            stalled: false,

            previous_raw: 0.0,
            raw: 0.0,
            filtered: 0.0,
        }
    }

    /// Capture counter wrapped around.
    #[inline]
    pub fn on_overflow(&mut self) {
        self.overflow_count = self.overflow_count.saturating_add(1);
    }

    /// A magnet passed; `capture` is the latched counter value.
    pub fn on_capture(&mut self, capture: u16) {
        let previous = self.last_capture.replace(capture);
        let overflows = core::mem::take(&mut self.overflow_count);
        self.ticks_since_capture = 0;
        if self.stalled {
            debug!("velocity: moving again");
            self.stalled = false;
        }

        // First edge after power-up only sets the reference.
        let Some(previous) = previous else {
            return;
        };

        let raw_ticks = capture as i32 - previous as i32;
        let elapsed_s =
            raw_ticks as f32 / self.clock_hz + overflows as f32 * self.overflow_period_s;
        if elapsed_s <= 0.0 {
            return;
        }

        let raw = self.distance_per_capture_m / elapsed_s;
        let smoothed = (1.0 - self.smoothing) * raw + self.smoothing * self.previous_raw;

        self.previous_raw = raw;
        self.raw = raw.clamp(0.0, self.max_velocity);
        self.filtered = smoothed.clamp(0.0, self.max_velocity);
    }

    /// Control tick. Forces velocity to zero once the stall threshold is exceeded.
    pub fn on_tick(&mut self) {
        self.ticks_since_capture = self.ticks_since_capture.saturating_add(1);
        if self.ticks_since_capture > self.stall_ticks && !self.stalled {
            debug!("velocity: stalled after {} ticks", self.ticks_since_capture);
            self.stalled = true;
            self.raw = 0.0;
            self.filtered = 0.0;
        }
    }

    /// Velocity in m/s, per the configured feedback source. Zero while stalled.
    pub fn velocity(&self) -> f32 {
        if self.stalled {
            return 0.0;
        }
        match self.feedback {
            VelocityFeedback::Raw => self.raw,
            VelocityFeedback::Smoothed => self.filtered,
        }
    }

    #[inline]
    pub fn raw_velocity(&self) -> f32 {
        self.raw
    }

    #[inline]
    pub fn smoothed_velocity(&self) -> f32 {
        self.filtered
    }

    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    #[inline]
    pub fn overflow_count(&self) -> u16 {
        self.overflow_count
    }

    #[inline]
    pub fn ticks_since_capture(&self) -> u16 {
        self.ticks_since_capture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(cfg: VelocityConfig) -> VelocityEstimator {
        VelocityEstimator::new(&cfg)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// Expected velocity for a capture period in counter ticks with the default geometry.
    fn expected(cfg: &VelocityConfig, ticks: f32) -> f32 {
        cfg.distance_per_capture_m() / (ticks / cfg.capture_clock_hz)
    }

    #[test]
    fn first_capture_only_sets_reference() {
        let mut v = estimator(VelocityConfig::default());
        v.on_capture(1234);
        assert_eq!(v.velocity(), 0.0);
    }

    #[test]
    fn smoothing_blends_with_previous_raw_sample() {
        let cfg = VelocityConfig::default();
        let mut v = estimator(cfg);
        v.on_capture(0);
        v.on_capture(50_000);

        let raw = expected(&cfg, 50_000.0);
        assert!(approx(v.raw_velocity(), raw));
        assert!(approx(v.smoothed_velocity(), 0.5 * raw));
    }

    #[test]
    fn constant_input_converges_to_itself() {
        let cfg = VelocityConfig::default();
        let mut v = estimator(cfg);
        let mut t: u16 = 0;
        v.on_capture(t);
        for _ in 0..10 {
            let (next, wrapped) = t.overflowing_add(40_000);
            if wrapped {
                v.on_overflow();
            }
            t = next;
            v.on_capture(t);
        }
        let raw = expected(&cfg, 40_000.0);
        assert!(approx(v.velocity(), raw));
    }

    #[test]
    fn recurrence_uses_raw_history_not_output() {
        let cfg = VelocityConfig::default();
        let mut v = estimator(cfg);
        v.on_capture(0);
        v.on_capture(30_000);
        v.on_capture(50_000);

        let r1 = expected(&cfg, 30_000.0);
        let r2 = expected(&cfg, 20_000.0);
        assert!(approx(v.smoothed_velocity(), 0.5 * r2 + 0.5 * r1));
    }

    #[test]
    fn overflow_correction_adds_wrapped_periods() {
        let cfg = VelocityConfig::default();

        let mut wrapped = estimator(cfg);
        wrapped.on_capture(60_000);
        wrapped.on_overflow();
        wrapped.on_capture(40_000);

        let mut straight = estimator(cfg);
        straight.on_capture(0);
        straight.on_capture(45_536);

        assert!(approx(wrapped.raw_velocity(), straight.raw_velocity()));
        assert!(approx(wrapped.raw_velocity(), expected(&cfg, 45_536.0)));
        assert_eq!(wrapped.overflow_count(), 0);
    }

    #[test]
    fn overflow_alone_does_not_change_velocity() {
        let mut v = estimator(VelocityConfig::default());
        v.on_capture(0);
        v.on_capture(50_000);
        let before = v.velocity();
        v.on_overflow();
        v.on_overflow();
        assert_eq!(v.velocity(), before);
        assert_eq!(v.overflow_count(), 2);
    }

    #[test]
    fn non_positive_period_is_discarded() {
        let mut v = estimator(VelocityConfig::default());
        v.on_capture(100);
        v.on_capture(100);
        assert_eq!(v.velocity(), 0.0);
    }

    #[test]
    fn velocity_is_clamped_to_max() {
        let cfg = VelocityConfig::default();
        let mut v = estimator(cfg);
        v.on_capture(0);
        v.on_capture(10);
        v.on_capture(20);
        assert_eq!(v.raw_velocity(), cfg.max_velocity);
        assert_eq!(v.smoothed_velocity(), cfg.max_velocity);
    }

    #[test]
    fn stall_forces_zero_after_threshold() {
        let mut v = estimator(VelocityConfig::default());
        v.on_capture(0);
        v.on_capture(50_000);
        assert!(v.velocity() > 0.0);

        for _ in 0..50 {
            v.on_tick();
        }
        assert!(!v.is_stalled());
        assert!(v.velocity() > 0.0);

        v.on_tick();
        assert!(v.is_stalled());
        assert_eq!(v.velocity(), 0.0);
    }

    #[test]
    fn capture_resets_stall_counter() {
        let mut v = estimator(VelocityConfig::default());
        v.on_capture(0);
        for _ in 0..40 {
            v.on_tick();
        }
        v.on_capture(50_000);
        assert_eq!(v.ticks_since_capture(), 0);
        for _ in 0..40 {
            v.on_tick();
        }
        assert!(!v.is_stalled());
    }

    #[test]
    fn raw_feedback_reports_unsmoothed_sample() {
        let cfg = VelocityConfig::default().with_feedback(VelocityFeedback::Raw);
        let mut v = estimator(cfg);
        v.on_capture(0);
        v.on_capture(50_000);
        assert!(approx(v.velocity(), expected(&cfg, 50_000.0)));
    }
}
