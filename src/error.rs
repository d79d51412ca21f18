// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types.
//!
//! The control loops themselves never fail: a lost line, a stalled wheel or an out-of-range command
//! are handled in place. Errors only surface when a configuration is rejected at startup or when a
//! motor direction arrives that does not map to a bridge topology.

use thiserror::Error;

/// Reasons a [`VehicleConfig`](crate::config::VehicleConfig) is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("scan length {length} exceeds pixel buffer capacity {capacity}")]
    ScanLengthTooLarge { length: usize, capacity: usize },

    #[error("usable width {width} must be in 2..={length}")]
    UsableWidth { width: usize, length: usize },

    #[error("steering limits out of order: right {right_us}us, center {center_us}us, left {left_us}us")]
    SteeringLimits {
        right_us: u16,
        center_us: u16,
        left_us: u16,
    },

    #[error("smoothing factor {0} must be in [0, 1)")]
    Smoothing(f32),

    #[error("magnet count must be non-zero")]
    NoMagnets,

    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

/// Motor bridge faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotorError {
    /// Raw direction code with no bridge mapping. The bridge is stopped when this is returned.
    #[error("invalid motor direction code {0}")]
    InvalidDirection(u8),
}
