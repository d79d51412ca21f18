// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # linecar Firmware
//!
//! This crate contains the control core of a line-following car: a linear camera scan is turned
//! into a steering command, and a magnetic wheel pickup into a velocity estimate that regulates
//! forward speed. It targets an STM32F767 MCU; all control logic is hardware-independent and
//! runs on the host for testing.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Tuning parameters and strategy selection |
//! | [`sensors`] | Line camera scan, line center, wheel velocity |
//! | [`control`] | Steering and speed loops |
//! | [`drivers`] | Drive motor bridge mapping |
//! | [`context`] | Interrupt handlers over the shared control state |
//! | `hw` | MCU-level wrappers around timers, ADC, PWM, USART (`firmware` feature) |
//!
//! ## Getting Started
//!
//! Run the control tests on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features firmware --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod context;
pub mod control;
pub mod drivers;
pub mod error;
pub mod sensors;

#[cfg(feature = "firmware")]
pub mod hw;

pub use config::VehicleConfig;
pub use context::{ControlContext, ControlOutput, Telemetry};
