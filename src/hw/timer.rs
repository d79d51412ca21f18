// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Periodic update-interrupt timers via direct PAC register access.
//!
//! - TIM6: control tick (50 Hz)
//! - TIM7: line-camera pixel clock
//! - TIM2: SI pulse toggle, started per scan and stopped by the pulse sequencer
//!
//! Each timer raises its update interrupt once per period; the ISR must call
//! [`TickTimer::clear_update`] before returning.

use stm32f7xx_hal::pac;

/// Prescaler and auto-reload for `rate_hz` from `timer_clock_hz`, both registers 16-bit.
fn divider(timer_clock_hz: u32, rate_hz: u32) -> (u16, u16) {
    let ticks = (timer_clock_hz / rate_hz.max(1)).max(1);
    let psc = (ticks - 1) / 0x1_0000;
    let arr = (ticks / (psc + 1)).saturating_sub(1).max(1);
    (psc as u16, arr.min(0xFFFF) as u16)
}

pub struct TickTimer<TIM> {
    tim: TIM,
}

impl<TIM> TickTimer<TIM> {
    /// Consume the wrapper and return the underlying timer peripheral.
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

fn init_basic(tim: &pac::tim6::RegisterBlock, timer_clock_hz: u32, rate_hz: u32) {
    let (psc, arr) = divider(timer_clock_hz, rate_hz);

    // Disable counter while configuring
    tim.cr1.modify(|_, w| w.cen().clear_bit());

    tim.psc.write(|w| unsafe { w.bits(psc as u32) });
    tim.arr.write(|w| unsafe { w.bits(arr as u32) });

    // Latch PSC/ARR, then drop the update flag the latch produced
    tim.egr.write(|w| w.ug().set_bit());
    tim.sr.modify(|_, w| w.uif().clear_bit());

    // Update interrupt
    tim.dier.modify(|_, w| w.uie().set_bit());
}

impl TickTimer<pac::TIM6> {
    /// Configure TIM6 as the control tick and start it.
    pub fn tim6(tim6: pac::TIM6, timer_clock_hz: u32, rate_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim6en().set_bit());

        init_basic(&tim6, timer_clock_hz, rate_hz);
        tim6.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim: tim6 }
    }

    #[inline]
    pub fn clear_update(&mut self) {
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }
}

impl TickTimer<pac::TIM7> {
    /// Configure TIM7 as the pixel clock and start it.
    pub fn tim7(tim7: pac::TIM7, timer_clock_hz: u32, rate_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim7en().set_bit());

        init_basic(&tim7, timer_clock_hz, rate_hz);
        tim7.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim: tim7 }
    }

    #[inline]
    pub fn clear_update(&mut self) {
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }
}

impl TickTimer<pac::TIM2> {
    /// Configure TIM2 as the SI toggle timer. Left stopped until a scan starts.
    pub fn tim2(tim2: pac::TIM2, timer_clock_hz: u32, rate_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let (psc, arr) = divider(timer_clock_hz, rate_hz);
        let tim = tim2;

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.psc.write(|w| unsafe { w.bits(psc as u32) });
        tim.arr.write(|w| unsafe { w.bits(arr as u32) });
        tim.egr.write(|w| w.ug().set_bit());
        tim.sr.modify(|_, w| w.uif().clear_bit());
        tim.dier.modify(|_, w| w.uie().set_bit());

        Self { tim }
    }

    #[inline]
    pub fn clear_update(&mut self) {
        self.tim.sr.modify(|_, w| w.uif().clear_bit());
    }

    /// Restart from zero.
    pub fn start(&mut self) {
        self.tim.cnt.write(|w| unsafe { w.bits(0) });
        self.tim.cr1.modify(|_, w| w.cen().set_bit());
    }

    #[inline]
    pub fn stop(&mut self) {
        self.tim.cr1.modify(|_, w| w.cen().clear_bit());
    }
}
