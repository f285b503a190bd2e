//! End-to-end host protocol tests: bytes in through a transport, frames
//! out, with the mailbox, parser, service and codec in between.

use crate::mock_hw::{ActuatorCall, LoopbackTransport, ManualClock, MockHardware, RecordingSink};

use ess_controller::adapters::hardware::HardwareAdapter;
use ess_controller::adapters::usb_serial::UsbSerialTransport;
use ess_controller::app::events::{AppEvent, StatusReport, SystemState};
use ess_controller::app::service::AppService;
use ess_controller::config::SystemConfig;
use ess_controller::control::mode::{ChargeMode, EnableSignal, Led, RelayCommand};
use ess_controller::fault::{FaultState, FaultTracker};
use ess_controller::rpc::engine::{RpcEngine, MAX_WRITE_STALLS};
use ess_controller::rpc::mailbox::CommandMailbox;
use ess_controller::rpc::transport::Transport;
use ess_controller::scheduler::TickCounter;
use ess_controller::sensors::voltage::sim_set_adc;
use ess_controller::sensors::VoltageChannel;

struct Rig {
    app: AppService<'static>,
    rpc: RpcEngine<'static, LoopbackTransport>,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: SystemConfig) -> Self {
        let faults: &'static FaultTracker = Box::leak(Box::new(FaultTracker::default()));
        let ticks: &'static TickCounter = Box::leak(Box::new(TickCounter::new()));
        let mailbox: &'static CommandMailbox = Box::leak(Box::new(CommandMailbox::new()));

        let mut app = AppService::new(&config, faults, ticks);
        let rpc = RpcEngine::new(LoopbackTransport::new(), mailbox, &config);
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        Self { app, rpc, hw, sink }
    }

    /// Deliver one chunk and run a full receive → dispatch pass.
    fn send(&mut self, chunk: &[u8]) {
        self.rpc.transport_mut().send(chunk);
        self.rpc.poll_receive();
        self.rpc.poll(&mut self.app, &mut self.hw, &mut self.sink);
    }

    fn output(&mut self) -> String {
        self.rpc.transport_mut().take_text()
    }

    fn applied(&self) -> usize {
        self.sink.count(|e| matches!(e, AppEvent::CommandApplied(_)))
    }
}

// ── Command frames ────────────────────────────────────────────

#[test]
fn led_frame_sets_that_led() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.send(b"L31");
    assert!(rig.hw.led(Led::Charging));
    assert_eq!(rig.hw.leds, [false, false, false, true, false, false]);
}

#[test]
fn out_of_range_led_index_is_a_silent_no_op() {
    let mut rig = Rig::new(SystemConfig::default());
    let calls_before = rig.hw.calls.len();
    rig.send(b"L61");

    assert_eq!(rig.hw.calls.len(), calls_before, "no output touched");
    assert_eq!(rig.applied(), 0);
    assert!(rig.output().is_empty(), "nothing sent back by default");
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandRejected(_))), 1);
}

#[test]
fn out_of_range_charge_mode_leaves_mode_unchanged() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.send(b"C1");
    rig.send(b"C3");
    assert_eq!(rig.app.mode().charge_mode, ChargeMode::Normal);
    assert!(rig.hw.enable(EnableSignal::Charge));
}

#[test]
fn rejections_are_reported_when_configured() {
    let config = SystemConfig {
        report_rejected_commands: true,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(config);

    rig.send(b"C3");
    assert_eq!(rig.output(), "ERROR:BAD_PARAMETER\r\n");
    rig.send(b"Q");
    assert_eq!(rig.output(), "ERROR:UNKNOWN_COMMAND\r\n");
    rig.send(b"E1");
    assert_eq!(rig.output(), "ERROR:MISSING_PARAMETER\r\n");
    assert_eq!(rig.applied(), 0);
}

#[test]
fn relay_frames_pulse_the_named_coil() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.send(b"R1");
    rig.send(b"R2");
    rig.send(b"R0");
    assert_eq!(
        rig.hw.relay_calls(),
        vec![RelayCommand::Off, RelayCommand::Set, RelayCommand::Reset, RelayCommand::Off]
    );
}

#[test]
fn enable_frame_overrides_a_single_line() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.send(b"P1");
    rig.send(b"E20\r\n");
    assert_eq!(
        rig.hw.calls.iter().rev().find(|c| matches!(c, ActuatorCall::Enable(EnableSignal::Block100A, _))),
        Some(&ActuatorCall::Enable(EnableSignal::Block100A, false))
    );
    assert!(rig.hw.enable(EnableSignal::Block200A));
}

// ── Mailbox semantics ─────────────────────────────────────────

#[test]
fn undrained_frame_is_replaced_by_the_next() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.rpc.transport_mut().send(b"C1");
    rig.rpc.transport_mut().send(b"C2");
    rig.rpc.poll_receive();
    rig.rpc.poll_receive();
    assert!(rig.rpc.poll(&mut rig.app, &mut rig.hw, &mut rig.sink));
    assert!(!rig.rpc.poll(&mut rig.app, &mut rig.hw, &mut rig.sink));

    assert_eq!(rig.app.mode().charge_mode, ChargeMode::Fast);
    assert_eq!(rig.applied(), 1, "C1 was never seen");
}

#[test]
fn oversized_chunk_is_dropped_before_the_mailbox() {
    let mut rig = Rig::new(SystemConfig::default());
    let mut chunk = vec![b' '; 64];
    chunk[0] = b'P';
    chunk[1] = b'1';
    rig.rpc.transport_mut().send(&chunk);
    assert!(!rig.rpc.poll_receive());
    assert!(!rig.rpc.poll(&mut rig.app, &mut rig.hw, &mut rig.sink));
    assert!(!rig.app.mode().power_output);
}

// ── Status frames ─────────────────────────────────────────────

#[test]
fn status_request_replies_with_one_frame() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.hw.voltages = [12.5, 13.0, 12.75, 12.25];
    rig.send(b"S");
    assert_eq!(
        rig.output(),
        "BAT:51,STATE:0,FAULT:0,V1:12500,V2:13000,V3:12750,V4:12250\r\n"
    );
}

#[test]
fn status_frame_carries_live_faults_and_state() {
    let mut rig = Rig::new(SystemConfig::default());
    let clock = ManualClock(0);
    rig.send(b"C2");
    rig.hw.lines[1] = false;
    rig.app.tick(&mut rig.hw, &clock, &mut rig.sink);
    rig.send(b"S");

    let report = StatusReport::parse(&rig.output()).expect("well-formed status frame");
    assert_eq!(report.state, SystemState::Error);
    assert_eq!(report.faults, FaultState::BLOCK_100A);
}

// ── Short writes ──────────────────────────────────────────────

/// Link with a small TX ring: at most `per_write` bytes per call and
/// `room` bytes in total before it stops accepting anything.
struct TrickleTransport {
    per_write: usize,
    room: usize,
    tx: Vec<u8>,
    writes: u32,
}

impl TrickleTransport {
    fn new(per_write: usize, room: usize) -> Self {
        Self {
            per_write,
            room,
            tx: Vec::new(),
            writes: 0,
        }
    }
}

impl Transport for TrickleTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.writes += 1;
        let n = data.len().min(self.per_write).min(self.room - self.tx.len());
        self.tx.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

fn trickle_engine(per_write: usize, room: usize) -> RpcEngine<'static, TrickleTransport> {
    let mailbox: &'static CommandMailbox = Box::leak(Box::new(CommandMailbox::new()));
    RpcEngine::new(TrickleTransport::new(per_write, room), mailbox, &SystemConfig::default())
}

fn sample_report() -> StatusReport {
    StatusReport {
        battery_level: 51,
        state: SystemState::Standby,
        faults: FaultState::empty(),
        voltages: [12.5, 13.0, 12.75, 12.25],
    }
}

#[test]
fn short_writes_still_deliver_the_whole_frame() {
    let mut rpc = trickle_engine(7, usize::MAX);
    rpc.send_status(&sample_report());
    rpc.send_error("BAD_PARAMETER");

    let out = String::from_utf8(rpc.transport_mut().tx.clone()).unwrap();
    assert_eq!(
        out,
        "BAT:51,STATE:0,FAULT:0,V1:12500,V2:13000,V3:12750,V4:12250\r\nERROR:BAD_PARAMETER\r\n"
    );
}

#[test]
fn stalled_link_gives_up_after_bounded_retries() {
    let mut rpc = trickle_engine(4, 10);
    rpc.send_status(&sample_report());

    let t = rpc.transport_mut();
    assert_eq!(t.tx, b"BAT:51,STA");
    // 3 productive writes, then the stall budget.
    assert_eq!(t.writes, 3 + MAX_WRITE_STALLS);
}

// ── Full stack on the host simulation twins ───────────────────

#[test]
fn simulated_board_answers_status_over_usb() {
    let config = SystemConfig::default();
    let faults: &'static FaultTracker = Box::leak(Box::new(FaultTracker::default()));
    let ticks: &'static TickCounter = Box::leak(Box::new(TickCounter::new()));
    let mailbox: &'static CommandMailbox = Box::leak(Box::new(CommandMailbox::new()));

    let mut hw = HardwareAdapter::from_config(&config);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(&config, faults, ticks);
    let mut rpc = RpcEngine::new(UsbSerialTransport::new().unwrap(), mailbox, &config);
    app.start(&mut hw, &mut sink);

    sim_set_adc(VoltageChannel::BankA, 4095);
    rpc.transport_mut().sim_inject(b"S\r\n");
    rpc.poll_receive();
    rpc.poll(&mut app, &mut hw, &mut sink);

    let out = String::from_utf8(rpc.transport_mut().sim_take_output()).unwrap();
    let report = StatusReport::parse(&out).expect("status frame");
    assert_eq!(report.battery_level, 100, "16.5 V is above the full threshold");
    assert!((report.voltages[2] - 16.5).abs() < 0.01);
    assert!(report.voltages[0].abs() < 0.001);
}
