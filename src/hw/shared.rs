// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! State shared between interrupt handlers.
//!
//! A [`Shared`] cell is a `static` that starts empty, is filled once at startup and afterwards is
//! only reachable inside `cortex_m::interrupt::free`, so no handler ever sees a half-updated value.
//!
//! ```ignore
//! static CAR: Shared<Car> = Shared::new();
//!
//! #[interrupt]
//! fn TIM6_DAC() {
//!     CAR.with(|car| car.on_control_tick());
//! }
//! ```

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};

pub struct Shared<T> {
    inner: Mutex<RefCell<Option<T>>>,
}

impl<T> Shared<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the value. Replaces any previous one.
    pub fn init(&self, value: T) {
        interrupt::free(|cs| {
            self.inner.borrow(cs).replace(Some(value));
        });
    }

    /// Run `f` on the value with interrupts masked. `None` if not yet initialized.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        interrupt::free(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// Move the value out, leaving the cell empty.
    pub fn take(&self) -> Option<T> {
        interrupt::free(|cs| self.inner.borrow(cs).borrow_mut().take())
    }
}
