// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rotation pickup input capture on TIM3 channel 1.
//!
//! TIM3 free-runs over the full 16-bit range. A rising edge from the hall sensor latches the
//! counter into CCR1; the update interrupt marks each wraparound.

use stm32f7xx_hal::pac;

/// One event decoded from the TIM3 status register.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaptureEvent {
    Overflow,
    Capture(u16),
}

pub struct CaptureTimer {
    tim: pac::TIM3,
}

impl CaptureTimer {
    /// Configure TIM3 CH1 for input capture at `counter_hz` and start it.
    pub fn tim3(tim3: pac::TIM3, timer_clock_hz: u32, counter_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        let tim = tim3;
        let psc = (timer_clock_hz / counter_hz.max(1)).saturating_sub(1);

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.psc.write(|w| unsafe { w.bits(psc) });

        // Auto-reload: max 16-bit
        tim.arr.write(|w| unsafe { w.bits(0xFFFF) });

        // CH1 input from TI1, 8-sample filter against hall sensor bounce
        tim.ccmr1_input().modify(|_, w| unsafe { w.cc1s().bits(0b01).ic1f().bits(0b0011) });

        // Rising edge, capture enabled
        tim.ccer
            .modify(|_, w| w.cc1p().clear_bit().cc1np().clear_bit().cc1e().set_bit());

        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.write(|w| unsafe { w.bits(0) });

        // Capture and overflow interrupts
        tim.dier.modify(|_, w| w.cc1ie().set_bit().uie().set_bit());

        // Reset and enable counter
        tim.cnt.write(|w| unsafe { w.bits(0) });
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Read and clear pending events, in the order they happened.
    ///
    /// When a capture and a wraparound are pending together, a capture value in the lower half of
    /// the range was latched after the wrap.
    pub fn poll(&mut self) -> [Option<CaptureEvent>; 2] {
        let sr = self.tim.sr.read();
        let overflowed = sr.uif().bit_is_set();
        let captured = sr.cc1if().bit_is_set();

        if overflowed {
            self.tim.sr.modify(|_, w| w.uif().clear_bit());
        }
        // Reading CCR1 clears CC1IF
        let capture = captured.then(|| self.tim.ccr1.read().bits() as u16);

        match (overflowed, capture) {
            (true, Some(v)) if v < 0x8000 => {
                [Some(CaptureEvent::Overflow), Some(CaptureEvent::Capture(v))]
            }
            (true, Some(v)) => [Some(CaptureEvent::Capture(v)), Some(CaptureEvent::Overflow)],
            (true, None) => [Some(CaptureEvent::Overflow), None],
            (false, Some(v)) => [Some(CaptureEvent::Capture(v)), None],
            (false, None) => [None, None],
        }
    }

    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> pac::TIM3 {
        self.tim
    }
}
