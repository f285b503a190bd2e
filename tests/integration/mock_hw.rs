//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO registers.

use std::collections::VecDeque;

use ess_controller::app::events::AppEvent;
use ess_controller::app::ports::{ActuatorPort, Clock, EventSink, SensorPort};
use ess_controller::control::mode::{EnableSignal, Led, RelayCommand};
use ess_controller::error::FaultLine;
use ess_controller::rpc::transport::Transport;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Enable(EnableSignal, bool),
    Led(Led, bool),
    Relay(RelayCommand),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    /// Status-frame order: load, charge, bank A, bank B.
    pub voltages: [f32; 4],
    /// Raw line levels; `false` = asserted.
    pub lines: [bool; 4],
    pub enables: [bool; 4],
    pub leds: [bool; 6],
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            voltages: [0.0, 0.0, 12.7, 12.7],
            lines: [true; 4],
            enables: [false; 4],
            leds: [false; 6],
        }
    }

    pub fn set_bank_a(&mut self, volts: f32) {
        self.voltages[2] = volts;
    }

    pub fn assert_line(&mut self, line: FaultLine, asserted: bool) {
        self.lines[line.index()] = !asserted;
    }

    pub fn enable(&self, signal: EnableSignal) -> bool {
        self.enables[signal as usize]
    }

    pub fn led(&self, led: Led) -> bool {
        self.leds[led as usize]
    }

    pub fn relay_calls(&self) -> Vec<RelayCommand> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Relay(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn set_enable(&mut self, signal: EnableSignal, on: bool) {
        self.enables[signal as usize] = on;
        self.calls.push(ActuatorCall::Enable(signal, on));
    }

    fn set_led(&mut self, led: Led, on: bool) {
        self.leds[led as usize] = on;
        self.calls.push(ActuatorCall::Led(led, on));
    }

    fn drive_relay(&mut self, cmd: RelayCommand) {
        self.calls.push(ActuatorCall::Relay(cmd));
    }

    fn all_off(&mut self) {
        self.enables = [false; 4];
        self.leds = [false; 6];
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── SensorPort for MockHardware ──────────────────────────────

impl SensorPort for MockHardware {
    fn read_voltages(&mut self) -> [f32; 4] {
        self.voltages
    }

    fn read_fault_lines(&mut self) -> [bool; 4] {
        self.lines
    }
}

// ── ManualClock ───────────────────────────────────────────────

pub struct ManualClock(pub u64);

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&mut self, ms: u64) {
        self.0 += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── LoopbackTransport ─────────────────────────────────────────

/// Host side of the link: queued chunks in, written bytes out.
pub struct LoopbackTransport {
    pub rx: VecDeque<Vec<u8>>,
    pub tx: Vec<u8>,
}

#[allow(dead_code)]
impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
        }
    }

    pub fn send(&mut self, chunk: &[u8]) {
        self.rx.push_back(chunk.to_vec());
    }

    /// Written output as text, drained.
    pub fn take_text(&mut self) -> String {
        String::from_utf8(core::mem::take(&mut self.tx)).expect("frames are ASCII")
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackTransport {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let Some(chunk) = self.rx.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}
