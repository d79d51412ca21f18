// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuning parameters for the line-following vehicle.
//!
//! Every constant the control loops depend on lives here so a board bring-up only touches one
//! file. Each group has a `Default` matching the tuned car and `with_*` setters for overrides:
//!
//! ```
//! use linecar::config::{SteeringConfig, VehicleConfig, VelocityConfig};
//!
//! let cfg = VehicleConfig::default()
//!     .with_steering(SteeringConfig::default().with_gains(6.0, 0.0))
//!     .with_velocity(VelocityConfig::default().with_max_velocity(1.5));
//! assert!(cfg.validate().is_ok());
//! ```

use crate::drivers::motor_bridge::MAX_DUTY;
use crate::error::ConfigError;
use crate::sensors::line_scanner::BUFFER_CAPACITY;

/// Period of the control tick in seconds (TIM6 at 50 Hz).
pub const TICK_PERIOD_S: f32 = 0.020;

/// Line-camera acquisition and line-center settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScanConfig {
    /// Number of pixels clocked out per scan, including the trailing dummy pixels.
    pub scan_length: usize,
    /// Pixels that map to real positions on the track.
    pub usable_width: usize,
    /// Fraction of full scale at or below which a sample counts as line.
    pub threshold_ratio: f32,
    /// Which center estimate feeds the steering loop.
    pub centering: CenteringStrategy,
}

/// How the line center is extracted from a binarized frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CenteringStrategy {
    /// Midpoint of the first background→line→background run.
    FirstEdgePair,
    /// Mean index of every line pixel in the usable width.
    WeightedAverage,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_length: 130,
            usable_width: 128,
            threshold_ratio: 0.758,
            centering: CenteringStrategy::FirstEdgePair,
        }
    }
}

impl ScanConfig {
    pub fn with_centering(mut self, centering: CenteringStrategy) -> Self {
        self.centering = centering;
        self
    }

    pub fn with_threshold_ratio(mut self, ratio: f32) -> Self {
        self.threshold_ratio = ratio;
        self
    }

    /// Raw 16-bit threshold for binarizing camera samples.
    #[inline]
    pub fn threshold_raw(&self) -> u16 {
        (self.threshold_ratio.clamp(0.0, 1.0) * u16::MAX as f32) as u16
    }

    /// Horizontal position the steering loop tries to hold the line at.
    #[inline]
    pub fn target_center(&self) -> i32 {
        (self.usable_width / 2) as i32
    }
}

/// Steering filter selection.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SteeringPolicy {
    /// `center + Kp * error`.
    Proportional,
    /// Proportional plus `Kd * d(error)/dt`.
    ProportionalDerivative,
    /// Proportional command passed through a single-pole smoother.
    Smoothed,
}

/// Steering servo limits and gains. Pulse widths are in microseconds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SteeringConfig {
    pub center_us: u16,
    /// Full-right pulse. Numerically smaller than `left_limit_us`.
    pub right_limit_us: u16,
    /// Full-left pulse.
    pub left_limit_us: u16,
    pub kp: f32,
    pub kd: f32,
    /// Weight of the previous output in [`SteeringPolicy::Smoothed`].
    pub smoothing: f32,
    pub policy: SteeringPolicy,
    /// Time between two evaluated scans, seconds.
    pub cycle_time_s: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            center_us: 1500,
            right_limit_us: 1100,
            left_limit_us: 1900,
            kp: 8.0,
            kd: 0.05,
            smoothing: 0.5,
            policy: SteeringPolicy::Proportional,
            cycle_time_s: TICK_PERIOD_S,
        }
    }
}

impl SteeringConfig {
    pub fn with_gains(mut self, kp: f32, kd: f32) -> Self {
        self.kp = kp;
        self.kd = kd;
        self
    }

    pub fn with_policy(mut self, policy: SteeringPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_limits(mut self, right_us: u16, center_us: u16, left_us: u16) -> Self {
        self.right_limit_us = right_us;
        self.center_us = center_us;
        self.left_limit_us = left_us;
        self
    }
}

/// Which velocity sample the speed loop regulates against.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VelocityFeedback {
    /// Latest single-period estimate.
    Raw,
    /// Exponentially smoothed estimate.
    Smoothed,
}

/// Rotation pickup geometry, estimator filtering and speed loop gains.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VelocityConfig {
    /// Capture counter clock in Hz.
    pub capture_clock_hz: f32,
    /// Ticks until the 16-bit capture counter wraps.
    pub counter_period_ticks: u32,
    pub wheel_radius_m: f32,
    /// Magnets on the wheel, one capture per magnet.
    pub magnet_count: u8,
    /// Weight of the previous raw sample.
    pub smoothing: f32,
    /// Control ticks without a capture before velocity is forced to zero.
    pub stall_ticks: u16,
    pub max_velocity: f32,
    /// Steering error (pixels) at which desired velocity reaches zero.
    pub error_max: f32,
    /// Duty counts added per m/s of velocity error each tick.
    pub kp: f32,
    pub feedback: VelocityFeedback,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            capture_clock_hz: 250_000.0,
            counter_period_ticks: 1 << 16,
            wheel_radius_m: 0.032,
            magnet_count: 2,
            smoothing: 0.5,
            stall_ticks: 50,
            max_velocity: 2.0,
            error_max: 64.0,
            kp: 600.0,
            feedback: VelocityFeedback::Smoothed,
        }
    }
}

impl VelocityConfig {
    pub fn with_max_velocity(mut self, v: f32) -> Self {
        self.max_velocity = v;
        self
    }

    pub fn with_gain(mut self, kp: f32) -> Self {
        self.kp = kp;
        self
    }

    pub fn with_feedback(mut self, feedback: VelocityFeedback) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Seconds per counter wraparound.
    #[inline]
    pub fn overflow_period_s(&self) -> f32 {
        self.counter_period_ticks as f32 / self.capture_clock_hz
    }

    /// Arc length travelled between two consecutive magnet passes, meters.
    #[inline]
    pub fn distance_per_capture_m(&self) -> f32 {
        self.wheel_radius_m * (2.0 * core::f32::consts::PI / self.magnet_count as f32)
    }
}

/// Drive motor bridge settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriveConfig {
    /// Duty commanded at power-up before the speed loop takes over.
    pub startup_duty: u16,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            startup_duty: MAX_DUTY / 2,
        }
    }
}

/// Complete vehicle configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VehicleConfig {
    pub scan: ScanConfig,
    pub steering: SteeringConfig,
    pub velocity: VelocityConfig,
    pub drive: DriveConfig,
}

impl VehicleConfig {
    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_steering(mut self, steering: SteeringConfig) -> Self {
        self.steering = steering;
        self
    }

    pub fn with_velocity(mut self, velocity: VelocityConfig) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_drive(mut self, drive: DriveConfig) -> Self {
        self.drive = drive;
        self
    }

    /// Check that the parameters describe a car the loops can actually run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scan = &self.scan;
        if scan.scan_length > BUFFER_CAPACITY {
            return Err(ConfigError::ScanLengthTooLarge {
                length: scan.scan_length,
                capacity: BUFFER_CAPACITY,
            });
        }
        if scan.usable_width < 2 || scan.usable_width > scan.scan_length {
            return Err(ConfigError::UsableWidth {
                width: scan.usable_width,
                length: scan.scan_length,
            });
        }

        let s = &self.steering;
        if !(s.right_limit_us <= s.center_us && s.center_us <= s.left_limit_us)
            || s.right_limit_us == s.left_limit_us
        {
            return Err(ConfigError::SteeringLimits {
                right_us: s.right_limit_us,
                center_us: s.center_us,
                left_us: s.left_limit_us,
            });
        }
        if !(s.cycle_time_s > 0.0) {
            return Err(ConfigError::NonPositive("steering cycle time"));
        }
        if !(0.0..1.0).contains(&s.smoothing) {
            return Err(ConfigError::Smoothing(s.smoothing));
        }

        let v = &self.velocity;
        if v.magnet_count == 0 {
            return Err(ConfigError::NoMagnets);
        }
        if !(v.capture_clock_hz > 0.0) {
            return Err(ConfigError::NonPositive("capture clock"));
        }
        if v.counter_period_ticks == 0 {
            return Err(ConfigError::NonPositive("counter period"));
        }
        if !(v.wheel_radius_m > 0.0) {
            return Err(ConfigError::NonPositive("wheel radius"));
        }
        if !(v.max_velocity > 0.0) {
            return Err(ConfigError::NonPositive("max velocity"));
        }
        if !(v.error_max > 0.0) {
            return Err(ConfigError::NonPositive("error max"));
        }
        if !(0.0..1.0).contains(&v.smoothing) {
            return Err(ConfigError::Smoothing(v.smoothing));
        }

        Ok(())
    }
}
