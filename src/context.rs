// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The vehicle's control context.
//!
//! All control state lives in one [`ControlContext`]. Each interrupt source has a handler method
//! here; the firmware calls them from its ISRs while holding the context in a critical section
//! (see `hw::shared`) and applies the returned outputs to the peripherals.
//!
//! | Interrupt            | Handler                                   |
//! | -------------------- | ----------------------------------------- |
//! | Pixel clock          | [`ControlContext::on_pixel_tick`]         |
//! | ADC end-of-conversion| [`ControlContext::on_conversion_complete`]|
//! | SI toggle timer      | [`ControlContext::on_si_timer`]           |
//! | Capture edge         | [`ControlContext::on_capture`]            |
//! | Capture overflow     | [`ControlContext::on_capture_overflow`]   |
//! | Control tick (20 ms) | [`ControlContext::on_control_tick`]       |

use log::{debug, info};

use crate::config::VehicleConfig;
use crate::control::{SteeringController, VelocityController};
use crate::drivers::motor_bridge::{ChannelRatios, Direction, MotorDriver};
use crate::error::ConfigError;
use crate::sensors::center::{CenterEstimator, LineEdge};
use crate::sensors::line_scanner::{LineScanner, ScanAction, ScanState};
use crate::sensors::si_pulse::{SiPulse, SiStep};
use crate::sensors::velocity::VelocityEstimator;

/// Peripheral updates produced by one control tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControlOutput {
    /// Steering servo pulse width in microseconds.
    pub steering_us: u16,
    /// Drive bridge ratios.
    pub motor: ChannelRatios,
    /// Line found in the frame evaluated this tick. `None` if the line was lost or no frame was
    /// ready.
    pub line: Option<LineEdge>,
    /// Whether a frame was evaluated this tick.
    pub evaluated: bool,
}

/// Snapshot for debug logging.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub ticks: u32,
    pub frames: u32,
    pub scan_state: ScanState,
    pub center: Option<usize>,
    pub steering_error: i32,
    pub steering_us: u16,
    pub velocity: f32,
    pub desired_velocity: f32,
    pub duty: u16,
    pub stalled: bool,
}

pub struct ControlContext {
    scanner: LineScanner,
    si: SiPulse,
    estimator: CenterEstimator,
    steering: SteeringController,
    velocity: VelocityEstimator,
    speed: VelocityController,
    motor: MotorDriver,
    direction: Direction,

    ticks: u32,
    last_center: Option<usize>,
}

impl ControlContext {
    /// Validate the configuration and build the context.
    pub fn new(cfg: &VehicleConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let target_center = cfg.scan.target_center();
        let startup_duty = cfg.drive.startup_duty;

        let mut motor = MotorDriver::new();
        motor.set(Direction::Forward, startup_duty);

        info!(
            "control: {:?} centering, {:?} steering, target center {}, startup duty {}",
            cfg.scan.centering, cfg.steering.policy, target_center, startup_duty
        );

        Ok(Self {
            scanner: LineScanner::new(&cfg.scan),
            si: SiPulse::new(),
            estimator: CenterEstimator::new(&cfg.scan),
            steering: SteeringController::new(&cfg.steering, target_center),
            velocity: VelocityEstimator::new(&cfg.velocity),
            speed: VelocityController::new(&cfg.velocity, startup_duty),
            motor,
            direction: Direction::Forward,

            ticks: 0,
            last_center: None,
        })
    }

    /// Pixel clock interrupt. Arms the SI pulse when a scan starts.
    pub fn on_pixel_tick(&mut self) -> ScanAction {
        let action = self.scanner.on_pixel_tick();
        if action == ScanAction::StartIntegration {
            self.si.arm();
        }
        action
    }

    /// ADC conversion-complete interrupt with the raw 16-bit sample.
    #[inline]
    pub fn on_conversion_complete(&mut self, sample: u16) {
        self.scanner.on_conversion_complete(sample);
    }

    /// SI toggle timer interrupt.
    #[inline]
    pub fn on_si_timer(&mut self) -> SiStep {
        self.si.on_timer()
    }

    /// Capture edge from the rotation pickup.
    #[inline]
    pub fn on_capture(&mut self, capture: u16) {
        self.velocity.on_capture(capture);
    }

    /// Capture counter overflow.
    #[inline]
    pub fn on_capture_overflow(&mut self) {
        self.velocity.on_overflow();
    }

    /// Periodic control tick: steering from the latest frame, stall detection, speed loop.
    pub fn on_control_tick(&mut self) -> ControlOutput {
        self.ticks = self.ticks.wrapping_add(1);

        let mut line = None;
        let evaluated = match self.scanner.take_frame() {
            Some(frame) => {
                line = self.estimator.estimate(frame);
                true
            }
            None => false,
        };

        if evaluated {
            if line.is_none() && self.last_center.is_some() {
                debug!("steering: line lost, holding {}us", self.steering.command_us());
            }
            self.last_center = line.map(|l| l.center);
            self.steering.update(self.last_center);
        }

        self.velocity.on_tick();
        let velocity = self.velocity.velocity();
        let duty = self.speed.update(self.steering.previous_error(), velocity);
        let motor = self.motor.set(self.direction, duty);

        ControlOutput {
            steering_us: self.steering.command_us(),
            motor,
            line,
            evaluated,
        }
    }

    /// Bridge ratios for the current command, e.g. to apply at startup.
    #[inline]
    pub fn motor_ratios(&self) -> ChannelRatios {
        self.motor.ratios()
    }

    #[inline]
    pub fn steering_us(&self) -> u16 {
        self.steering.command_us()
    }

    #[inline]
    pub fn motor(&self) -> &MotorDriver {
        &self.motor
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity.velocity()
    }

    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            ticks: self.ticks,
            frames: self.scanner.frames(),
            scan_state: self.scanner.state(),
            center: self.last_center,
            steering_error: self.steering.previous_error(),
            steering_us: self.steering.command_us(),
            velocity: self.velocity.velocity(),
            desired_velocity: self.speed.desired(),
            duty: self.motor.duty(),
            stalled: self.velocity.is_stalled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::motor_bridge::MAX_DUTY;

    #[test]
    fn starts_forward_at_startup_duty() {
        let ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
        let r = ctx.motor_ratios();
        assert_eq!(r.back_a, MAX_DUTY);
        assert_eq!(r.front_a, MAX_DUTY - MAX_DUTY / 2);
        assert_eq!(ctx.steering_us(), 1500);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut cfg = VehicleConfig::default();
        cfg.velocity.magnet_count = 0;
        assert!(matches!(
            ControlContext::new(&cfg),
            Err(ConfigError::NoMagnets)
        ));
    }

    #[test]
    fn scan_start_arms_si_pulse() {
        let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
        assert_eq!(ctx.on_pixel_tick(), ScanAction::StartIntegration);
        assert!(ctx.on_si_timer().timer_enabled);
        assert!(!ctx.on_si_timer().timer_enabled);
    }

    #[test]
    fn tick_without_frame_keeps_steering() {
        let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
        let out = ctx.on_control_tick();
        assert!(!out.evaluated);
        assert_eq!(out.line, None);
        assert_eq!(out.steering_us, 1500);
        assert_eq!(ctx.ticks(), 1);
    }
}
