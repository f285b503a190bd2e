//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB console in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | state={} | level={}% | faults=0x{:02X} | \
                     load={:.2}V charge={:.2}V bankA={:.2}V bankB={:.2}V",
                    s.state.name(),
                    s.battery_level,
                    s.faults.bits(),
                    s.voltages[0],
                    s.voltages[1],
                    s.voltages[2],
                    s.voltages[3],
                );
            }
            AppEvent::FaultDetected(f) => {
                warn!("FAULT | detected: {}", f);
            }
            AppEvent::FaultCleared(f) => {
                info!("FAULT | cleared: {}", f);
            }
            AppEvent::CommandApplied(cmd) => {
                info!("CMD | applied {:?}", cmd);
            }
            AppEvent::CommandRejected(reason) => {
                info!("CMD | rejected: {}", reason);
            }
            AppEvent::RelayPulsed(cmd) => {
                info!("RELAY | {:?}", cmd);
            }
            AppEvent::Started => {
                info!("START | controller running");
            }
        }
    }
}
