// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Sensor Processing
//!
//! Interrupt-driven front ends for the line camera and the wheel rotation pickup.
//!
//! ## Modules
//!
//! - [`line_scanner`] - Scan state machine and binarized pixel buffer.
//! - [`si_pulse`] - Start-of-integration pulse sequencing.
//! - [`center`] - Line-center estimation from a completed frame.
//! - [`velocity`] - Capture-period velocity with overflow correction, smoothing and stall timeout.

pub mod center;
pub mod line_scanner;
pub mod si_pulse;
pub mod velocity;

pub use center::{CenterEstimator, LineEdge};
pub use line_scanner::{LineScanner, Pixel, PixelBuffer, ScanAction, ScanState};
pub use si_pulse::{SiLevel, SiPulse, SiStep};
pub use velocity::VelocityEstimator;
