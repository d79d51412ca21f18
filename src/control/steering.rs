// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Steering servo control from the line position.
//!
//! Called once per evaluated scan. The error is measured in pixels from the target center; a
//! positive error means the line is left of center, which maps to a larger (more left) pulse.
//!
//! Works in `no_std` and does not allocate memory.

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{SteeringConfig, SteeringPolicy};

/// Steering loop state.
pub struct SteeringController {
    policy: SteeringPolicy,
    center_us: f32,
    right_limit_us: f32,
    left_limit_us: f32,
    kp: f32,
    kd: f32,
    smoothing: f32,
    cycle_time_s: f32,
    target_center: i32,

    /// Error from the last scan that found the line.
    previous_error: i32,
    /// Output memory for [`SteeringPolicy::Smoothed`].
    previous_filtered: f32,
    /// Command currently held by the servo.
    command_us: u16,
}

impl SteeringController {
    pub fn new(cfg: &SteeringConfig, target_center: i32) -> Self {
        Self {
            policy: cfg.policy,
            center_us: cfg.center_us as f32,
            right_limit_us: cfg.right_limit_us as f32,
            left_limit_us: cfg.left_limit_us as f32,
            kp: cfg.kp,
            kd: cfg.kd,
            smoothing: cfg.smoothing,
            cycle_time_s: cfg.cycle_time_s,
            target_center,

            previous_error: 0,
            previous_filtered: cfg.center_us as f32,
            command_us: cfg.center_us,
        }
    }

    /// Run one steering step.
    ///
    /// `center` — line center in pixels, or `None` if the scan did not find the line. A lost line
    /// leaves the held command and all filter memory untouched.
    ///
    /// Returns the servo pulse width in microseconds, within `[right_limit, left_limit]`.
    pub fn update(&mut self, center: Option<usize>) -> u16 {
        let Some(center) = center else {
            return self.command_us;
        };

        let error = self.target_center - center as i32;
        let proportional = self.center_us + self.kp * error as f32;

        let raw = match self.policy {
            SteeringPolicy::Proportional => proportional,
            SteeringPolicy::ProportionalDerivative => {
                let de = (error - self.previous_error) as f32;
                proportional + self.kd * de / self.cycle_time_s
            }
            SteeringPolicy::Smoothed => {
                let filtered =
                    (1.0 - self.smoothing) * proportional + self.smoothing * self.previous_filtered;
                self.previous_filtered = filtered;
                filtered
            }
        };

        let out = raw.round().clamp(self.right_limit_us, self.left_limit_us);
        self.previous_error = error;
        self.command_us = out as u16;
        self.command_us
    }

    /// Error from the most recent scan that found the line.
    #[inline]
    pub fn previous_error(&self) -> i32 {
        self.previous_error
    }

    /// Command currently held by the servo.
    #[inline]
    pub fn command_us(&self) -> u16 {
        self.command_us
    }

    #[inline]
    pub fn policy(&self) -> SteeringPolicy {
        self.policy
    }
}
