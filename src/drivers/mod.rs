// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Device-level logic that sits above the raw `hw/` layer and below the control loops.
//!
//! ## Existing drivers
//!
//! - [`motor_bridge`] – Four-leg drive motor bridge with active-low PWM inputs

pub mod motor_bridge;

pub use motor_bridge::{Channel, ChannelRatios, Direction, MotorCommand, MotorDriver, MAX_DUTY};
