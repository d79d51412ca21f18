// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! Closed loops run from the periodic control tick.
//!
//! ## Modules
//!
//! - [`steering`] - Line-position to servo pulse, with P, PD and smoothed policies.
//! - [`velocity`] - Speed target from steering error and the accumulating duty update.

pub mod steering;
pub mod velocity;

pub use steering::SteeringController;
pub use velocity::VelocityController;
