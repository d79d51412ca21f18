// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line-camera ADC on ADC1 using direct PAC register access.
//!
//! Single-shot software-triggered conversions of one channel with the end-of-conversion interrupt
//! enabled. Results are left-aligned to 16 bits so the control core sees full-scale samples.
//!
//! Example:
//! ```ignore
//! let mut adc = LineAdc::adc1(dp.ADC1, 3);
//! adc.start();
//! // ... in the ADC interrupt:
//! let sample = adc.read_sample();
//! ```

use stm32f7xx_hal::pac;

pub struct LineAdc {
    adc: pac::ADC1,
}

fn configure_common() {
    let common = unsafe { &*pac::ADC_COMMON::ptr() };

    // ADC prescaler: PCLK2 / 4
    common.ccr.modify(|_, w| w.adcpre().div4());
}

fn init_single_channel(adc: &pac::adc1::RegisterBlock, channel: u8) {
    // Power off to configure
    adc.cr2.modify(|_, w| w.adon().clear_bit());

    // 12-bit, end-of-conversion interrupt
    adc.cr1.modify(|_, w| w.res().bits(0b00).eocie().set_bit());

    // Single conversion, left-aligned, software trigger
    adc.cr2.modify(|_, w| {
        w.cont().clear_bit();
        w.align().left();
        w.exten().disabled();
        w
    });

    // Short sample time: one pixel must convert well inside a pixel clock period
    adc.smpr2.modify(|_, w| unsafe { w.bits(0) });

    // Sequence length = 1 conversion on `channel`
    adc.sqr1.modify(|_, w| w.l().bits(0));
    adc.sqr3
        .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

    // Power on
    adc.cr2.modify(|_, w| w.adon().set_bit());
}

impl LineAdc {
    /// Create and initialize ADC1 for `channel`.
    pub fn adc1(adc1: pac::ADC1, channel: u8) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        configure_common();
        init_single_channel(&adc1, channel);

        Self { adc: adc1 }
    }

    /// Trigger one conversion. Completion raises the ADC interrupt.
    #[inline]
    pub fn start(&mut self) {
        self.adc.cr2.modify(|_, w| w.swstart().set_bit());
    }

    /// Read the finished conversion as a 16-bit sample. Clears EOC.
    #[inline]
    pub fn read_sample(&mut self) -> u16 {
        self.adc.dr.read().data().bits() as u16
    }

    #[inline]
    pub fn free(self) -> pac::ADC1 {
        self.adc
    }
}
