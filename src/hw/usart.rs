// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART debug output and the `log` backend.
//!
//! [`Usart`] wraps the TX half of a HAL serial port and implements `core::fmt::Write`.
//! [`init_logger`] installs it as the global [`log`] sink: each record becomes one
//! `LEVEL target - message\r\n` line.
//!
//! The debug port is best effort. The logger moves the `Usart` out of its cell for the duration of
//! one record, so the blocking byte writes never run with interrupts masked; a record logged from
//! an interrupt while the main loop is mid-line is dropped.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt::{self, Write};
use nb::block;

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use stm32f7xx_hal::{
    pac,
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::hw::shared::Shared;

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// Debug port used by the logger.
pub type DebugUsart = Usart<pac::USART3>;

static PORT: Shared<DebugUsart> = Shared::new();

struct UsartLogger;

impl log::Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Busy elsewhere: drop the record.
        let Some(mut port) = PORT.take() else {
            return;
        };
        let _ = write!(
            port,
            "{} {} - {}\r\n",
            record.level(),
            record.target(),
            record.args()
        );
        PORT.init(port);
    }

    fn flush(&self) {
        PORT.with(|port| port.flush());
    }
}

static LOGGER: UsartLogger = UsartLogger;

/// Install `port` as the global log sink.
pub fn init_logger(port: DebugUsart, level: LevelFilter) -> Result<(), SetLoggerError> {
    PORT.init(port);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
