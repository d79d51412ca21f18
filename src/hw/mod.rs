// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU Wrappers
//!
//! Register-level setup for the STM32F767 peripherals the car uses. Only built with the
//! `firmware` feature.

pub mod adc;
pub mod capture;
pub mod led;
pub mod pins;
pub mod pwm;
pub mod shared;
pub mod timer;
pub mod usart;

pub use adc::LineAdc;
pub use capture::{CaptureEvent, CaptureTimer};
pub use led::Led;
pub use pins::BoardPins;
pub use pwm::{MotorPwm, ServoPwm};
pub use shared::Shared;
pub use timer::TickTimer;
pub use usart::Usart;
