//! ESS Controller Firmware: Main Entry Point
//!
//! Single cooperative super-loop; the only concurrency is the fault-line
//! ISRs and the 1 kHz tick callback, both of which touch atomics only.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Sensor+Actuator) (EventSink)    (Config)     (Clock)         │
//! │  UsbSerialTransport → RpcEngine (mailbox, codec)               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FaultTracker · ModeCoordinator · BatteryModel         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  fault ISRs ──▶ FaultTracker      esp_timer ──▶ TickCounter    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{error, info, warn};

use ess_controller::adapters::hardware::HardwareAdapter;
use ess_controller::adapters::log_sink::LogEventSink;
use ess_controller::adapters::nvs::NvsAdapter;
use ess_controller::adapters::time::Esp32TimeAdapter;
use ess_controller::adapters::usb_serial::UsbSerialTransport;
use ess_controller::app::ports::ConfigPort;
use ess_controller::app::service::AppService;
use ess_controller::config::SystemConfig;
use ess_controller::control::indicators::{FailStop, ERROR_BLINK_PERIOD_MS};
use ess_controller::drivers::{hw_init, watchdog::Watchdog};
use ess_controller::fault::{FaultTracker, DEFAULT_FAULT_TIMEOUT_MS};
use ess_controller::rpc::engine::RpcEngine;
use ess_controller::rpc::mailbox::CommandMailbox;
use ess_controller::scheduler::TickCounter;

// ── ISR-shared state ──────────────────────────────────────────

static FAULTS: FaultTracker = FaultTracker::new(DEFAULT_FAULT_TIMEOUT_MS);
static TICKS: TickCounter = TickCounter::new();
static MAILBOX: CommandMailbox = CommandMailbox::new();

/// Idle time between loop passes.
const LOOP_DELAY_MS: u32 = 1;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ESS Controller v{:<20}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config unavailable ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 3. Bring up the board and the host link ───────────────
    let mut hw = HardwareAdapter::from_config(&config);
    let transport = match hw_init::bring_up(&TICKS, &FAULTS).and_then(|()| UsbSerialTransport::new()) {
        Ok(t) => t,
        Err(e) => {
            error!("bring-up failed: {}, halting", e);
            fail_stop(&mut hw);
        }
    };
    let watchdog = Watchdog::new();

    // ── 4. Construct adapters and service ─────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut rpc = RpcEngine::new(transport, &MAILBOX, &config);
    let mut app = AppService::new(&config, &FAULTS, &TICKS);
    app.start(&mut hw, &mut sink);

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        rpc.poll_receive();
        rpc.poll(&mut app, &mut hw, &mut sink);

        if let Some(report) = app.tick(&mut hw, &clock, &mut sink) {
            rpc.send_status(&report);
        }

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}

/// Unrecoverable bring-up failure: everything off, all LEDs blink forever.
fn fail_stop(hw: &mut HardwareAdapter) -> ! {
    let mut blink = FailStop::enter(hw);
    loop {
        blink.blink(hw);
        FreeRtos::delay_ms(ERROR_BLINK_PERIOD_MS);
    }
}
