// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Forward speed regulation.
//!
//! The speed target follows the steering error: full speed on a centered line, slowing linearly to
//! a stop as the line approaches the edge of the usable window.
//!
//! The duty register is updated incrementally each tick,
//!
//! ```text
//! duty += Kp * (desired - velocity)
//! ```
//!
//! so the loop behaves like an integrator on velocity error rather than a stateless P controller.
//! The car's tuning depends on this, so it is kept as is.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::VelocityConfig;
use crate::drivers::motor_bridge::MAX_DUTY;

pub struct VelocityController {
    kp: f32,
    max_velocity: f32,
    error_max: f32,

    /// Duty register, in counts. Always within `[0, MAX_DUTY]`.
    duty: f32,
    desired: f32,
}

impl VelocityController {
    /// `initial_duty` seeds the duty register (the startup command).
    pub fn new(cfg: &VelocityConfig, initial_duty: u16) -> Self {
        Self {
            kp: cfg.kp,
            max_velocity: cfg.max_velocity,
            error_max: cfg.error_max,
            duty: initial_duty as f32,
            desired: 0.0,
        }
    }

    /// Desired velocity for a steering error, in `[0, max_velocity]`.
    pub fn desired_velocity(&self, steering_error: i32) -> f32 {
        let e = (steering_error as f32).abs();
        ((1.0 - e / self.error_max) * self.max_velocity).clamp(0.0, self.max_velocity)
    }

    /// Run one speed step and return the duty to command.
    ///
    /// `steering_error` — latest steering error in pixels
    /// `velocity` — measured velocity in m/s
    pub fn update(&mut self, steering_error: i32, velocity: f32) -> u16 {
        self.desired = self.desired_velocity(steering_error);
        self.duty = (self.duty + self.kp * (self.desired - velocity)).clamp(0.0, MAX_DUTY as f32);
        self.duty()
    }

    /// Current duty register.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty as u16
    }

    /// Speed target from the last update.
    #[inline]
    pub fn desired(&self) -> f32 {
        self.desired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(initial: u16) -> VelocityController {
        VelocityController::new(&VelocityConfig::default(), initial)
    }

    #[test]
    fn desired_velocity_is_max_on_center_and_zero_at_edge() {
        let c = controller(0);
        assert_eq!(c.desired_velocity(0), 2.0);
        assert_eq!(c.desired_velocity(64), 0.0);
        assert_eq!(c.desired_velocity(-64), 0.0);
        assert_eq!(c.desired_velocity(32), 1.0);
    }

    #[test]
    fn desired_velocity_is_non_increasing_and_bounded() {
        let c = controller(0);
        let mut last = f32::MAX;
        for e in 0..200 {
            let v = c.desired_velocity(e);
            assert!(v <= last);
            assert!((0.0..=2.0).contains(&v));
            assert_eq!(v, c.desired_velocity(-e));
            last = v;
        }
    }

    #[test]
    fn duty_accumulates_velocity_error() {
        let mut c = controller(10_000);
        // desired 2.0, measured 1.0: +600 per tick
        assert_eq!(c.update(0, 1.0), 10_600);
        assert_eq!(c.update(0, 1.0), 11_200);
        // on target: duty holds
        assert_eq!(c.update(0, 2.0), 11_200);
        // too fast: duty falls
        assert_eq!(c.update(0, 3.0), 10_600);
    }

    #[test]
    fn duty_is_clamped_to_register_range() {
        let mut c = controller(100);
        assert_eq!(c.update(64, 2.0), 0);

        let mut c = controller(MAX_DUTY - 100);
        assert_eq!(c.update(0, 0.0), MAX_DUTY);
        // no windup past the top: first slow-down step leaves the ceiling immediately
        assert_eq!(c.update(0, 3.0), MAX_DUTY - 600);
    }
}
