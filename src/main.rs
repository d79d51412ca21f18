// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! linecar firmware entry point.
//!
//! Brings up the peripherals, hands them together with the [`ControlContext`] to the interrupt
//! handlers, then sleeps. Everything after init happens in interrupts:
//!
//! - TIM7 pixel clock: scan sequencing, ADC triggers
//! - ADC: pixel samples
//! - TIM2: SI pulse
//! - TIM3: wheel captures and counter overflows
//! - TIM6: 20 ms control tick, servo and motor updates
//!
//! The main loop only prints periodic telemetry.

#![no_main]
#![no_std]

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use log::{info, trace, LevelFilter};
use panic_halt as _;

use hal::{
    gpio::{gpiob, Output, PushPull},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use linecar::config::TICK_PERIOD_S;
use linecar::hw::usart::init_logger;
use linecar::hw::{
    BoardPins, CaptureEvent, CaptureTimer, Led, LineAdc, MotorPwm, ServoPwm, Shared, TickTimer,
    Usart,
};
use linecar::sensors::{ScanAction, SiLevel};
use linecar::{ControlContext, Telemetry, VehicleConfig};

/// Pixel clock rate. 130 pixels fit in well under one control tick.
const PIXEL_CLOCK_HZ: u32 = 10_000;
/// SI toggle rate; the pulse is high for one period.
const SI_TOGGLE_HZ: u32 = 100_000;
/// ADC1 input for the camera's analog output (PA3).
const CAMERA_ADC_CHANNEL: u8 = 3;
/// Control ticks between telemetry lines.
const TELEMETRY_EVERY: u32 = 50;

/// Peripherals touched from interrupt context.
struct Io {
    pixel_clock: TickTimer<pac::TIM7>,
    si_timer: TickTimer<pac::TIM2>,
    control_timer: TickTimer<pac::TIM6>,
    adc: LineAdc,
    capture: CaptureTimer,
    motor_pwm: MotorPwm,
    servo: ServoPwm,
    si: gpiob::PB8<Output<PushPull>>,
    clk: gpiob::PB9<Output<PushPull>>,
    marker: Led<'B', 7>,
}

struct Car {
    ctx: ControlContext,
    io: Io,
    telemetry: Option<Telemetry>,
}

static CAR: Shared<Car> = Shared::new();

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let timer_clock_hz = clocks.sysclk().raw();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
    let mut status_led = Led::active_high(pins.leds.green);

    // USART3 (DBG)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART3,
        (pins.usart3.tx, pins.usart3.rx),
        &clocks,
        usart_cfg,
    );
    let _ = init_logger(Usart::new(serial), LevelFilter::Info);

    let cfg = VehicleConfig::default();
    let ctx = match ControlContext::new(&cfg) {
        Ok(ctx) => ctx,
        Err(e) => {
            log::error!("config rejected: {}", e);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    // Actuators start at the context's initial command
    let mut motor_pwm = MotorPwm::tim4(dp.TIM4);
    motor_pwm.apply(&ctx.motor_ratios());
    let servo = ServoPwm::tim9(dp.TIM9, timer_clock_hz, ctx.steering_us());

    let mut si = pins.camera.si;
    si.set_low();
    let mut clk = pins.camera.clk;
    clk.set_low();

    let control_rate_hz = (1.0 / TICK_PERIOD_S) as u32;
    let io = Io {
        pixel_clock: TickTimer::tim7(dp.TIM7, timer_clock_hz, PIXEL_CLOCK_HZ),
        si_timer: TickTimer::tim2(dp.TIM2, timer_clock_hz, SI_TOGGLE_HZ),
        control_timer: TickTimer::tim6(dp.TIM6, timer_clock_hz, control_rate_hz),
        adc: LineAdc::adc1(dp.ADC1, CAMERA_ADC_CHANNEL),
        capture: CaptureTimer::tim3(
            dp.TIM3,
            timer_clock_hz,
            cfg.velocity.capture_clock_hz as u32,
        ),
        motor_pwm,
        servo,
        si,
        clk,
        marker: Led::active_high(pins.leds.blue),
    };

    CAR.init(Car {
        ctx,
        io,
        telemetry: None,
    });

    unsafe {
        NVIC::unmask(pac::Interrupt::TIM7);
        NVIC::unmask(pac::Interrupt::ADC);
        NVIC::unmask(pac::Interrupt::TIM2);
        NVIC::unmask(pac::Interrupt::TIM3);
        NVIC::unmask(pac::Interrupt::TIM6_DAC);
    }

    info!("linecar running, control tick {} Hz", control_rate_hz);
    status_led.set(true);

    loop {
        cortex_m::asm::wfi();

        if let Some(Some(t)) = CAR.with(|car| car.telemetry.take()) {
            info!(
                "t={} frames={} center={:?} err={} steer={}us v={}m/s v*={}m/s duty={} stall={}",
                t.ticks,
                t.frames,
                t.center,
                t.steering_error,
                t.steering_us,
                t.velocity,
                t.desired_velocity,
                t.duty,
                t.stalled
            );
        }
    }
}

#[interrupt]
fn TIM7() {
    CAR.with(|car| {
        car.io.pixel_clock.clear_update();
        match car.ctx.on_pixel_tick() {
            ScanAction::StartIntegration => {
                car.io.si_timer.start();
                car.io.marker.toggle();
                trace!("scan marker");
            }
            ScanAction::TriggerConversion => {
                car.io.clk.set_high();
                car.io.adc.start();
            }
            ScanAction::FrameReady | ScanAction::None => {}
        }
    });
}

#[interrupt]
fn ADC() {
    CAR.with(|car| {
        let sample = car.io.adc.read_sample();
        car.io.clk.set_low();
        car.ctx.on_conversion_complete(sample);
    });
}

#[interrupt]
fn TIM2() {
    CAR.with(|car| {
        car.io.si_timer.clear_update();
        let step = car.ctx.on_si_timer();
        match step.level {
            SiLevel::High => car.io.si.set_high(),
            SiLevel::Low => car.io.si.set_low(),
        }
        if !step.timer_enabled {
            car.io.si_timer.stop();
        }
    });
}

#[interrupt]
fn TIM3() {
    CAR.with(|car| {
        for event in car.io.capture.poll().into_iter().flatten() {
            match event {
                CaptureEvent::Overflow => car.ctx.on_capture_overflow(),
                CaptureEvent::Capture(value) => car.ctx.on_capture(value),
            }
        }
    });
}

#[interrupt]
fn TIM6_DAC() {
    CAR.with(|car| {
        car.io.control_timer.clear_update();
        let out = car.ctx.on_control_tick();
        car.io.servo.set_pulse_us(out.steering_us);
        car.io.motor_pwm.apply(&out.motor);

        if car.ctx.ticks() % TELEMETRY_EVERY == 0 {
            car.telemetry = Some(car.ctx.telemetry());
        }
    });
}
