// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F767ZI car board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, gpioe, Alternate, Analog, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: Leds,
    pub usart3: Usart3Pins,
    pub camera: CameraPins,
    pub motor: MotorPins,
    pub servo: gpioe::PE5<Alternate<3>>, // TIM9_CH1
    pub pickup: gpioa::PA6<Alternate<2>>, // TIM3_CH1
}

pub struct Leds {
    pub green: gpiob::PB0<Output<PushPull>>, // LD1
    pub blue: gpiob::PB7<Output<PushPull>>,  // LD2
}

pub struct Usart3Pins {
    pub tx: gpiod::PD8<Alternate<7>>,
    pub rx: gpiod::PD9<Alternate<7>>,
}

/// Linear camera control and analog output
pub struct CameraPins {
    pub si: gpiob::PB8<Output<PushPull>>,
    pub clk: gpiob::PB9<Output<PushPull>>,
    pub ao: gpioa::PA3<Analog>, // ADC1_IN3
}

/// Drive bridge legs
pub struct MotorPins {
    pub fa: gpiod::PD12<Alternate<2>>, // TIM4_CH1
    pub fb: gpiod::PD13<Alternate<2>>, // TIM4_CH2
    pub ba: gpiod::PD14<Alternate<2>>, // TIM4_CH3
    pub bb: gpiod::PD15<Alternate<2>>, // TIM4_CH4
}

impl BoardPins {
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: Leds {
                green: gpiob.pb0.into_push_pull_output(),
                blue: gpiob.pb7.into_push_pull_output(),
            },

            usart3: Usart3Pins {
                tx: gpiod.pd8.into_alternate::<7>(),
                rx: gpiod.pd9.into_alternate::<7>(),
            },

            camera: CameraPins {
                si: gpiob.pb8.into_push_pull_output(),
                clk: gpiob.pb9.into_push_pull_output(),
                ao: gpioa.pa3.into_analog(),
            },

            motor: MotorPins {
                fa: gpiod.pd12.into_alternate::<2>(),
                fb: gpiod.pd13.into_alternate::<2>(),
                ba: gpiod.pd14.into_alternate::<2>(),
                bb: gpiod.pd15.into_alternate::<2>(),
            },

            servo: gpioe.pe5.into_alternate::<3>(),
            pickup: gpioa.pa6.into_alternate::<2>(),
        }
    }
}
