//! End-to-end control cycles through `ControlContext`, driven the way the interrupts drive it.

use linecar::config::{SteeringConfig, SteeringPolicy, VehicleConfig};
use linecar::drivers::{ChannelRatios, Direction, MAX_DUTY};
use linecar::sensors::{ScanAction, ScanState};
use linecar::{ControlContext, ControlOutput};

const DARK: u16 = 8_000;
const BRIGHT: u16 = 62_000;

/// Run pixel clock + ADC interrupts until a frame is ready.
fn scan(ctx: &mut ControlContext, sample: impl Fn(usize) -> u16) {
    let mut i = 0;
    loop {
        match ctx.on_pixel_tick() {
            ScanAction::StartIntegration => {
                // SI pulse: rise then fall, timer off
                assert!(ctx.on_si_timer().timer_enabled);
                assert!(!ctx.on_si_timer().timer_enabled);
            }
            ScanAction::TriggerConversion => {
                ctx.on_conversion_complete(sample(i));
                i += 1;
            }
            ScanAction::FrameReady => break,
            ScanAction::None => panic!("scanner stuck"),
        }
    }
    assert_eq!(i, 130);
}

fn tape(from: usize, to: usize) -> impl Fn(usize) -> u16 {
    move |i| if (from..to).contains(&i) { DARK } else { BRIGHT }
}

fn scan_and_tick(ctx: &mut ControlContext, sample: impl Fn(usize) -> u16) -> ControlOutput {
    scan(ctx, sample);
    ctx.on_control_tick()
}

#[test]
fn tape_at_30_to_39_steers_by_29_pixels() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    let out = scan_and_tick(&mut ctx, tape(30, 40));

    let line = out.line.expect("line should be found");
    assert_eq!((line.start, line.end, line.center), (30, 40, 35));
    assert!(out.evaluated);
    assert_eq!(out.steering_us, 1500 + 8 * 29);
    assert_eq!(ctx.telemetry().steering_error, 29);
}

#[test]
fn lost_line_holds_previous_steering_command() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    let first = scan_and_tick(&mut ctx, tape(80, 90));
    let lost = scan_and_tick(&mut ctx, |_| BRIGHT);

    assert!(lost.evaluated);
    assert_eq!(lost.line, None);
    assert_eq!(lost.steering_us, first.steering_us);
    assert_eq!(ctx.telemetry().steering_error, 64 - 85);
}

#[test]
fn steering_stays_in_range_for_extreme_lines() {
    let cfg = VehicleConfig::default().with_steering(
        SteeringConfig::default()
            .with_gains(40.0, 1.0)
            .with_policy(SteeringPolicy::ProportionalDerivative),
    );
    let mut ctx = ControlContext::new(&cfg).unwrap();

    for (from, to) in [(1, 3), (124, 127), (1, 3), (60, 70)] {
        let out = scan_and_tick(&mut ctx, tape(from, to));
        assert!((1100..=1900).contains(&out.steering_us));
    }
}

#[test]
fn scanner_waits_for_control_tick_between_frames() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    scan(&mut ctx, tape(60, 70));

    assert_eq!(ctx.telemetry().scan_state, ScanState::Evaluating);
    assert_eq!(ctx.on_pixel_tick(), ScanAction::None);

    ctx.on_control_tick();
    assert_eq!(ctx.telemetry().scan_state, ScanState::Idle);
    assert_eq!(ctx.on_pixel_tick(), ScanAction::StartIntegration);
    assert_eq!(ctx.telemetry().frames, 1);
}

#[test]
fn speed_loop_accelerates_then_backs_off_when_fast() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    let start = ctx.motor().duty();

    // Stationary with a centered line: duty climbs every tick.
    let mut last = start;
    for _ in 0..5 {
        let out = scan_and_tick(&mut ctx, tape(60, 68));
        let duty = ctx.motor().duty();
        assert!(duty > last);
        assert_eq!(out.motor, ChannelRatios::for_command(Direction::Forward, duty));
        last = duty;
    }

    // Wheel spinning near max: captures every 5000 counts (~5 m/s, clamped to 2.0).
    let mut t: u16 = 0;
    ctx.on_capture(t);
    for _ in 0..3 {
        t += 5_000;
        ctx.on_capture(t);
    }
    assert_eq!(ctx.velocity(), 2.0);

    // Line near the edge lowers the target below the measured velocity.
    let before = ctx.motor().duty();
    scan_and_tick(&mut ctx, tape(10, 14));
    assert!(ctx.motor().duty() < before);
}

#[test]
fn stall_timeout_zeroes_velocity() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    ctx.on_capture(0);
    ctx.on_capture(40_000);
    assert!(ctx.velocity() > 0.0);

    for _ in 0..50 {
        ctx.on_control_tick();
    }
    assert!(ctx.velocity() > 0.0);
    assert!(!ctx.telemetry().stalled);

    ctx.on_control_tick();
    assert_eq!(ctx.velocity(), 0.0);
    assert!(ctx.telemetry().stalled);

    // A new edge clears the stall; the next sample restores a velocity.
    ctx.on_capture_overflow();
    ctx.on_capture(10_000);
    assert!(!ctx.telemetry().stalled);
    assert!(ctx.velocity() > 0.0);
}

#[test]
fn duty_never_leaves_register_range() {
    let mut ctx = ControlContext::new(&VehicleConfig::default()).unwrap();
    for _ in 0..200 {
        ctx.on_control_tick();
        let r = ctx.motor_ratios();
        assert_eq!(r.back_a, MAX_DUTY);
        assert_eq!(r.back_b, MAX_DUTY);
        assert!(ctx.motor().duty() <= MAX_DUTY);
    }
    assert_eq!(ctx.motor().duty(), MAX_DUTY);
}
