// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PWM outputs via direct PAC register access.
//!
//! - [`MotorPwm`]: TIM4 CH1..CH4 feeding the four drive bridge legs, 16-bit ratios.
//! - [`ServoPwm`]: TIM9 CH1 steering servo, 50 Hz frame, pulse width set in microseconds.

use stm32f7xx_hal::pac;

use crate::drivers::motor_bridge::{Channel, ChannelRatios, MAX_DUTY};

/// PWM mode 1 with preload, for both channels of a CCMR register.
const CCMR_PWM1_PRELOAD: u32 = 0x6868;

/// Drive bridge PWM on TIM4: CH1 = FA, CH2 = FB, CH3 = BA, CH4 = BB.
pub struct MotorPwm {
    tim: pac::TIM4,
}

impl MotorPwm {
    /// Configure TIM4 for four-channel PWM and start it with every leg off.
    pub fn tim4(tim4: pac::TIM4) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // Full 16-bit period, no prescaler
        tim.psc.write(|w| unsafe { w.bits(0) });
        tim.arr.write(|w| unsafe { w.bits(MAX_DUTY as u32) });

        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });
        tim.ccmr2_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });

        let mut pwm = Self { tim };
        pwm.apply(&ChannelRatios::STOPPED);

        // Enable all four outputs, auto-reload preload, go
        pwm.tim.ccer.write(|w| unsafe { w.bits(0x1111) });
        pwm.tim.cr1.modify(|_, w| w.arpe().set_bit());
        pwm.tim.egr.write(|w| w.ug().set_bit());
        pwm.tim.cr1.modify(|_, w| w.cen().set_bit());

        pwm
    }

    /// Set one leg's ratio.
    pub fn set_ratio16(&mut self, channel: Channel, ratio: u16) {
        let bits = ratio as u32;
        match channel {
            Channel::FrontA => self.tim.ccr1.write(|w| unsafe { w.bits(bits) }),
            Channel::FrontB => self.tim.ccr2.write(|w| unsafe { w.bits(bits) }),
            Channel::BackA => self.tim.ccr3.write(|w| unsafe { w.bits(bits) }),
            Channel::BackB => self.tim.ccr4.write(|w| unsafe { w.bits(bits) }),
        }
    }

    /// Write all four legs.
    pub fn apply(&mut self, ratios: &ChannelRatios) {
        for ch in [Channel::FrontA, Channel::FrontB, Channel::BackA, Channel::BackB] {
            self.set_ratio16(ch, ratios.get(ch));
        }
    }
}

/// Steering servo PWM on TIM9 CH1 with a 1 MHz counter, so CCR1 is the pulse in microseconds.
pub struct ServoPwm {
    tim: pac::TIM9,
}

impl ServoPwm {
    /// Configure TIM9 CH1 and start it at `initial_us`.
    pub fn tim9(tim9: pac::TIM9, timer_clock_hz: u32, initial_us: u16) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.tim9en().set_bit());

        let tim = tim9;
        let psc = (timer_clock_hz / 1_000_000).saturating_sub(1);

        tim.cr1.modify(|_, w| w.cen().clear_bit());
        tim.psc.write(|w| unsafe { w.bits(psc) });

        // 20 ms frame
        tim.arr.write(|w| unsafe { w.bits(20_000 - 1) });

        tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD & 0xFF) });
        tim.ccr1.write(|w| unsafe { w.bits(initial_us as u32) });
        tim.ccer.write(|w| unsafe { w.bits(0x0001) });

        tim.cr1.modify(|_, w| w.arpe().set_bit());
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    /// Set the pulse width. Takes effect at the next frame.
    #[inline]
    pub fn set_pulse_us(&mut self, us: u16) {
        self.tim.ccr1.write(|w| unsafe { w.bits(us as u32) });
    }
}
