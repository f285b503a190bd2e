//! Integration tests for the AppService → ModeCoordinator → actuators
//! pipeline, driven tick by tick against mock adapters.

use crate::mock_hw::{ActuatorCall, ManualClock, MockHardware, RecordingSink};

use ess_controller::app::commands::Command;
use ess_controller::app::events::{AppEvent, SystemState};
use ess_controller::app::service::AppService;
use ess_controller::config::{IndicatorPolicy, SystemConfig};
use ess_controller::control::indicators::FailStop;
use ess_controller::control::mode::{ChargeMode, EnableSignal, Led, RelayCommand};
use ess_controller::error::FaultLine;
use ess_controller::fault::{FaultState, FaultTracker};
use ess_controller::scheduler::TickCounter;

fn started(
    config: &SystemConfig,
    faults: &'static FaultTracker,
    ticks: &'static TickCounter,
) -> (AppService<'static>, MockHardware, RecordingSink) {
    let mut app = AppService::new(config, faults, ticks);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

fn shared() -> (&'static FaultTracker, &'static TickCounter) {
    (
        Box::leak(Box::new(FaultTracker::default())),
        Box::leak(Box::new(TickCounter::new())),
    )
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_releases_relay_and_drives_everything_low() {
    let (faults, ticks) = shared();
    let (app, hw, sink) = started(&SystemConfig::default(), faults, ticks);

    assert_eq!(hw.calls.first(), Some(&ActuatorCall::Relay(RelayCommand::Off)));
    assert_eq!(hw.enables, [false; 4]);
    assert_eq!(hw.leds, [false; 6]);
    assert!(matches!(sink.events[0], AppEvent::Started));
    assert_eq!(app.state(), SystemState::Standby);
}

// ── Coordinated setters ───────────────────────────────────────

#[test]
fn charge_and_power_commands_reach_the_enable_lines() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);

    app.handle_command(Command::Charge(ChargeMode::Fast), &mut hw, &mut sink);
    assert!(hw.enable(EnableSignal::FastCharge));
    assert!(!hw.enable(EnableSignal::Charge));
    assert_eq!(app.state(), SystemState::Charging);

    app.handle_command(Command::Charge(ChargeMode::Off), &mut hw, &mut sink);
    app.handle_command(Command::Power(true), &mut hw, &mut sink);
    assert!(hw.enable(EnableSignal::Block100A));
    assert!(hw.enable(EnableSignal::Block200A));
    assert_eq!(app.state(), SystemState::Discharging);
}

#[test]
fn enable_override_survives_ticks_until_owner_setter_runs() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    app.handle_command(Command::Power(true), &mut hw, &mut sink);
    app.handle_command(Command::Enable(EnableSignal::Block100A, false), &mut hw, &mut sink);
    for _ in 0..5 {
        app.tick(&mut hw, &clock, &mut sink);
    }
    assert!(!hw.enable(EnableSignal::Block100A));
    assert!(hw.enable(EnableSignal::Block200A));

    app.handle_command(Command::Power(true), &mut hw, &mut sink);
    assert!(hw.enable(EnableSignal::Block100A));
}

#[test]
fn relay_command_pulses_once_and_is_not_reapplied_by_ticks() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    app.handle_command(Command::Relay(RelayCommand::Set), &mut hw, &mut sink);
    app.tick(&mut hw, &clock, &mut sink);
    app.tick(&mut hw, &clock, &mut sink);

    assert_eq!(hw.relay_calls(), vec![RelayCommand::Off, RelayCommand::Set]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RelayPulsed(RelayCommand::Set))),
        1
    );
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn fault_line_latches_error_state_and_clears_after_timeout() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let mut clock = ManualClock(1_000);

    hw.assert_line(FaultLine::Charge, true);
    app.tick(&mut hw, &clock, &mut sink);
    assert_eq!(app.faults(), FaultState::CHARGE);
    assert_eq!(app.state(), SystemState::Error);

    hw.assert_line(FaultLine::Charge, false);
    clock.advance(3_000);
    app.tick(&mut hw, &clock, &mut sink);
    assert_eq!(app.faults(), FaultState::CHARGE, "still inside the window");

    clock.advance(1);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(app.faults().is_empty());
    assert_eq!(app.state(), SystemState::Standby);

    assert_eq!(sink.count(|e| matches!(e, AppEvent::FaultDetected(FaultState::CHARGE))), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::FaultCleared(FaultState::CHARGE))), 1);
}

#[test]
fn isr_set_between_ticks_is_seen_by_the_next_tick() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(500);

    app.tick(&mut hw, &clock, &mut sink);
    // Simulated ISR: short pulse, line already released by the next poll.
    faults.set_flag(FaultState::BLOCK_200A, 501);
    app.tick(&mut hw, &clock, &mut sink);

    assert_eq!(app.faults(), FaultState::BLOCK_200A);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::FaultDetected(_))), 1);
}

#[test]
fn latched_fault_does_not_interlock_charging() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    app.handle_command(Command::Charge(ChargeMode::Normal), &mut hw, &mut sink);
    hw.assert_line(FaultLine::Charge, true);
    app.tick(&mut hw, &clock, &mut sink);

    assert_eq!(app.state(), SystemState::Error);
    assert!(hw.enable(EnableSignal::Charge), "charge enable is left as commanded");
}

#[test]
fn configured_timeout_is_pushed_into_the_tracker() {
    let (faults, ticks) = shared();
    let config = SystemConfig { fault_timeout_ms: 200, ..SystemConfig::default() };
    let (mut app, mut hw, mut sink) = started(&config, faults, ticks);
    let mut clock = ManualClock(0);

    hw.assert_line(FaultLine::Block100A, true);
    app.tick(&mut hw, &clock, &mut sink);
    hw.assert_line(FaultLine::Block100A, false);
    clock.advance(201);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(app.faults().is_empty());
}

// ── Status cadence and battery ────────────────────────────────

#[test]
fn status_fires_once_per_interval() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    let mut reports = 0;
    for _ in 0..4_001 {
        ticks.increment();
        if app.tick(&mut hw, &clock, &mut sink).is_some() {
            reports += 1;
        }
    }
    assert_eq!(reports, 1, "fires at tick 2001, next due at 4002");
    ticks.increment();
    assert!(app.tick(&mut hw, &clock, &mut sink).is_some());
}

#[test]
fn status_report_reflects_bank_a_level() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);

    hw.set_bank_a(12.7);
    let report = app
        .handle_command(Command::Status, &mut hw, &mut sink)
        .expect("status command returns a report");
    assert_eq!(report.battery_level, 50);
    assert_eq!(report.state, SystemState::Standby);
    assert_eq!(app.battery().map(|b| b.low_battery), Some(false));
}

#[test]
fn low_battery_lights_warning_led_on_next_tick() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    hw.set_bank_a(11.25);
    app.report_status(&mut hw, &mut sink);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(hw.led(Led::Warning));

    hw.set_bank_a(12.5);
    app.report_status(&mut hw, &mut sink);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(!hw.led(Led::Warning));
}

#[test]
fn automatic_indicators_follow_gauge_and_charge_mode() {
    let (faults, ticks) = shared();
    let config = SystemConfig {
        indicator_policy: IndicatorPolicy::Automatic,
        ..SystemConfig::default()
    };
    let (mut app, mut hw, mut sink) = started(&config, faults, ticks);

    hw.set_bank_a(14.4);
    app.report_status(&mut hw, &mut sink);
    app.handle_command(Command::Charge(ChargeMode::Normal), &mut hw, &mut sink);

    assert!(hw.led(Led::Level100));
    assert!(hw.led(Led::Charging));
    assert!(!hw.led(Led::Level0));
}

#[test]
fn manual_led_commands_are_held() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    let clock = ManualClock(0);

    app.handle_command(Command::Led(Led::CheckCharger, true), &mut hw, &mut sink);
    app.tick(&mut hw, &clock, &mut sink);
    assert!(hw.led(Led::CheckCharger));
    assert_eq!(app.desired_outputs().leds, hw.leds);
}

// ── Fail-stopped bring-up ─────────────────────────────────────

#[test]
fn fail_stop_drops_every_output_then_blinks() {
    let (faults, ticks) = shared();
    let (mut app, mut hw, mut sink) = started(&SystemConfig::default(), faults, ticks);
    app.handle_command(Command::Charge(ChargeMode::Fast), &mut hw, &mut sink);
    app.handle_command(Command::Power(true), &mut hw, &mut sink);
    hw.calls.clear();

    let mut blink = FailStop::enter(&mut hw);
    assert_eq!(hw.calls, vec![ActuatorCall::AllOff]);
    assert_eq!(hw.enables, [false; 4]);

    blink.blink(&mut hw);
    assert_eq!(hw.leds, [true; 6]);
    blink.blink(&mut hw);
    assert_eq!(hw.leds, [false; 6]);
    assert!(
        hw.calls.iter().all(|c| matches!(c, ActuatorCall::AllOff | ActuatorCall::Led(..))),
        "only LEDs move once fail-stopped"
    );
    assert_eq!(hw.enables, [false; 4]);
}
