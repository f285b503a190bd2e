//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the mode coordinator, battery model and status
//! cadence, and borrows the ISR-shared fault tracker and tick counter.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!       Clock ──▶ │          AppService          │
//! ActuatorPort ◀──│ Faults · Mode · Battery · ⏱  │ ──▶ StatusReport
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::battery::{BatteryModel, BatterySnapshot};
use crate::config::SystemConfig;
use crate::control::mode::{ModeCoordinator, OutputState, RelayCommand, SystemMode};
use crate::fault::{FaultState, FaultTracker};
use crate::scheduler::{PeriodicTimer, TickCounter};

use super::commands::Command;
use super::events::{AppEvent, StatusReport, SystemState};
use super::ports::{ActuatorPort, Clock, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<'a> {
    faults: &'a FaultTracker,
    ticks: &'a TickCounter,
    mode: ModeCoordinator,
    battery: BatteryModel,
    status_timer: PeriodicTimer,
    /// Most recent battery snapshot; `None` until the first status pass.
    snapshot: Option<BatterySnapshot>,
    /// Fault state seen by the previous tick, for transition events.
    last_faults: FaultState,
}

impl<'a> AppService<'a> {
    /// Construct the service.  Pushes the configured debounce window into
    /// the tracker and starts the status window at the current tick.
    pub fn new(config: &SystemConfig, faults: &'a FaultTracker, ticks: &'a TickCounter) -> Self {
        faults.set_timeout(config.fault_timeout_ms);
        Self {
            faults,
            ticks,
            mode: ModeCoordinator::new(config),
            battery: BatteryModel::new(config),
            status_timer: PeriodicTimer::new(config.status_interval_ticks, ticks.now()),
            snapshot: None,
            last_faults: FaultState::empty(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Release the relay coils and drive every output to its initial level.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.mode.set_relay_mode(RelayCommand::Off, hw);
        self.apply_outputs(hw);
        sink.emit(&AppEvent::Started);
        info!("AppService started, status every {} ticks", self.status_timer.interval());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop pass: poll faults → apply outputs → status cadence.
    ///
    /// Returns the status report when the cadence fired this pass.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Option<StatusReport> {
        // 1. Fault debounce (ISR sets since the last pass are already latched)
        let raw = hw.read_fault_lines();
        let faults = self.faults.check(clock.now_ms(), raw);
        self.emit_fault_transitions(faults, sink);

        // 2. Re-apply every derived output
        self.mode.apply(hw, self.snapshot.as_ref(), faults);

        // 3. Periodic status
        if self.status_timer.should_fire(self.ticks.now()) {
            Some(self.report_status(hw, sink))
        } else {
            None
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a validated host command.  `Status` returns a fresh report.
    pub fn handle_command(
        &mut self,
        cmd: Command,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> Option<StatusReport> {
        match cmd {
            Command::Status => return Some(self.report_status(hw, sink)),
            Command::Led(led, on) => self.mode.set_led(led, on),
            Command::Charge(mode) => self.mode.set_charge_mode(mode),
            Command::Power(on) => self.mode.set_power_output(on),
            Command::Enable(signal, on) => self.mode.set_enable_signal(signal, on),
            Command::Relay(relay) => {
                self.mode.set_relay_mode(relay, hw);
                sink.emit(&AppEvent::RelayPulsed(relay));
            }
        }
        debug!("command applied: {:?}", cmd);
        self.apply_outputs(hw);
        sink.emit(&AppEvent::CommandApplied(cmd));
        None
    }

    // ── Queries ───────────────────────────────────────────────

    /// Read fresh voltages, refresh the battery snapshot, and build a report
    /// with the live fault state.
    pub fn report_status(
        &mut self,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> StatusReport {
        let snapshot = self.battery.snapshot(hw.read_voltages());
        self.snapshot = Some(snapshot);

        let faults = self.faults.state();
        let report = StatusReport {
            battery_level: snapshot.battery_level,
            state: SystemState::derive(self.mode.mode(), faults),
            faults,
            voltages: snapshot.voltages,
        };
        sink.emit(&AppEvent::Status(report));
        report
    }

    pub fn mode(&self) -> &SystemMode {
        self.mode.mode()
    }

    pub fn battery(&self) -> Option<&BatterySnapshot> {
        self.snapshot.as_ref()
    }

    /// Latched faults as of now (no line poll).
    pub fn faults(&self) -> FaultState {
        self.faults.state()
    }

    pub fn state(&self) -> SystemState {
        SystemState::derive(self.mode.mode(), self.faults.state())
    }

    /// Outputs the next tick will drive.
    pub fn desired_outputs(&self) -> OutputState {
        self.mode
            .desired_outputs(self.snapshot.as_ref(), self.faults.state())
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        self.mode
            .apply(hw, self.snapshot.as_ref(), self.faults.state());
    }

    fn emit_fault_transitions(&mut self, faults: FaultState, sink: &mut impl EventSink) {
        let raised = faults.difference(self.last_faults);
        let cleared = self.last_faults.difference(faults);
        if !raised.is_empty() {
            warn!("Fault latched: {} (flags=0b{:08b})", raised, faults.bits());
            sink.emit(&AppEvent::FaultDetected(raised));
        }
        if !cleared.is_empty() {
            sink.emit(&AppEvent::FaultCleared(cleared));
        }
        self.last_faults = faults;
    }
}
