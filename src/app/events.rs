//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder, ...).

use crate::control::mode::{ChargeMode, RelayCommand, SystemMode};
use crate::fault::FaultState;

use super::commands::{Command, RejectReason};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; outputs are in their initial state.
    Started,

    /// A status frame was produced (periodic or on request).
    Status(StatusReport),

    /// These fault bits became latched since the previous tick.
    FaultDetected(FaultState),

    /// These fault bits cleared since the previous tick.
    FaultCleared(FaultState),

    /// A host command was applied.
    CommandApplied(Command),

    /// A host frame was dropped.
    CommandRejected(RejectReason),

    /// The relay coil pulse completed.
    RelayPulsed(RelayCommand),
}

/// Coarse operating state reported in the `STATE:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SystemState {
    #[default]
    Standby = 0,
    Charging = 1,
    Discharging = 2,
    Error = 3,
}

impl SystemState {
    /// Faults dominate, then charging, then power output.
    pub fn derive(mode: &SystemMode, faults: FaultState) -> Self {
        if !faults.is_empty() {
            Self::Error
        } else if mode.charge_mode != ChargeMode::Off {
            Self::Charging
        } else if mode.power_output {
            Self::Discharging
        } else {
            Self::Standby
        }
    }

    pub const fn from_index(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Standby),
            1 => Some(Self::Charging),
            2 => Some(Self::Discharging),
            3 => Some(Self::Error),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::Error => "Error",
        }
    }
}

/// Everything carried by one status frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub battery_level: u8,
    pub state: SystemState,
    pub faults: FaultState,
    /// Volts, in status-frame order: Load, Charge, BankA, BankB.
    pub voltages: [f32; 4],
}
