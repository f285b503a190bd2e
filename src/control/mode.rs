//! Mode coordinator.
//!
//! Owns the logical [`SystemMode`] (charge mode, power output, per-line
//! enable overrides, host LED states) and turns it into physical outputs.
//! The split is strict:
//!
//! - setters only mutate `SystemMode`;
//! - [`ModeCoordinator::desired_outputs`] is a pure function of the mode,
//!   the latest battery snapshot, and the fault state;
//! - [`ModeCoordinator::apply`] writes every line through the
//!   [`ActuatorPort`] once per tick, so pins converge on the logical state
//!   even if a write was missed.
//!
//! There is no fault→charge interlock here: a latched charger fault does
//! not force `ChargeMode::Off`.

use crate::app::ports::ActuatorPort;
use crate::battery::BatterySnapshot;
use crate::config::{IndicatorPolicy, SystemConfig};
use crate::fault::FaultState;

use super::indicators;

// ── Domain enums ──────────────────────────────────────────────

/// Charger selection.  Normal and Fast are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ChargeMode {
    #[default]
    Off = 0,
    Normal = 1,
    Fast = 2,
}

impl ChargeMode {
    pub const fn from_index(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Off),
            1 => Some(Self::Normal),
            2 => Some(Self::Fast),
            _ => None,
        }
    }
}

/// Physical enable outputs, in host `E` command index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnableSignal {
    FastCharge = 0,
    Charge = 1,
    Block100A = 2,
    Block200A = 3,
}

impl EnableSignal {
    pub const ALL: [Self; 4] = [
        Self::FastCharge,
        Self::Charge,
        Self::Block100A,
        Self::Block200A,
    ];

    pub const fn from_index(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::FastCharge),
            1 => Some(Self::Charge),
            2 => Some(Self::Block100A),
            3 => Some(Self::Block200A),
            _ => None,
        }
    }
}

/// Indicator LEDs, in host `L` command index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Led {
    /// Battery gauge: empty.
    Level0 = 0,
    /// Battery gauge: half.
    Level50 = 1,
    /// Battery gauge: full.
    Level100 = 2,
    Charging = 3,
    CheckCharger = 4,
    /// Low-voltage warning.
    Warning = 5,
}

impl Led {
    pub const ALL: [Self; 6] = [
        Self::Level0,
        Self::Level50,
        Self::Level100,
        Self::Charging,
        Self::CheckCharger,
        Self::Warning,
    ];

    pub const fn from_index(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Level0),
            1 => Some(Self::Level50),
            2 => Some(Self::Level100),
            3 => Some(Self::Charging),
            4 => Some(Self::CheckCharger),
            5 => Some(Self::Warning),
            _ => None,
        }
    }
}

/// Bistable relay request.  Consumed by a blocking coil pulse; the latch
/// position itself is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RelayCommand {
    /// Release both coils.
    Off = 0,
    /// Pulse the set coil (IN1).
    Set = 1,
    /// Pulse the reset coil (IN2).
    Reset = 2,
}

impl RelayCommand {
    pub const fn from_index(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Off),
            1 => Some(Self::Set),
            2 => Some(Self::Reset),
            _ => None,
        }
    }
}

// ── State ─────────────────────────────────────────────────────

/// Logical operating mode, mutated only through [`ModeCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemMode {
    pub charge_mode: ChargeMode,
    pub power_output: bool,
    /// Direct per-line overrides from `E` commands.  An override stands
    /// until the coordinated setter owning that line runs again.
    pub enable_overrides: [Option<bool>; 4],
    /// Host-set LED states from `L` commands.
    pub leds: [bool; 6],
}

/// Every physical output level for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputState {
    /// Indexed by [`EnableSignal`].
    pub enables: [bool; 4],
    /// Indexed by [`Led`].
    pub leds: [bool; 6],
}

impl OutputState {
    pub fn enable(&self, signal: EnableSignal) -> bool {
        self.enables[signal as usize]
    }

    pub fn led(&self, led: Led) -> bool {
        self.leds[led as usize]
    }
}

// ── Coordinator ───────────────────────────────────────────────

pub struct ModeCoordinator {
    mode: SystemMode,
    policy: IndicatorPolicy,
    low_battery_warning: bool,
}

impl Default for ModeCoordinator {
    fn default() -> Self {
        Self::new(&SystemConfig::default())
    }
}

impl ModeCoordinator {
    /// Everything off: no charging, power path open, all LEDs dark.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            mode: SystemMode::default(),
            policy: config.indicator_policy,
            low_battery_warning: config.low_battery_warning,
        }
    }

    pub fn mode(&self) -> &SystemMode {
        &self.mode
    }

    // ── Setters ───────────────────────────────────────────────

    /// Select the charger.  Takes back ownership of both charge lines.
    pub fn set_charge_mode(&mut self, mode: ChargeMode) {
        self.mode.charge_mode = mode;
        self.mode.enable_overrides[EnableSignal::FastCharge as usize] = None;
        self.mode.enable_overrides[EnableSignal::Charge as usize] = None;
    }

    /// Gate both block paths together.  Takes back ownership of both lines.
    pub fn set_power_output(&mut self, enabled: bool) {
        self.mode.power_output = enabled;
        self.mode.enable_overrides[EnableSignal::Block100A as usize] = None;
        self.mode.enable_overrides[EnableSignal::Block200A as usize] = None;
    }

    /// Diagnostic override of a single enable line.
    pub fn set_enable_signal(&mut self, signal: EnableSignal, on: bool) {
        self.mode.enable_overrides[signal as usize] = Some(on);
    }

    pub fn set_led(&mut self, led: Led, on: bool) {
        self.mode.leds[led as usize] = on;
    }

    /// Pulse the latching relay.  Blocks for the whole coil pulse; never
    /// call from interrupt context.
    pub fn set_relay_mode(&self, cmd: RelayCommand, hw: &mut impl ActuatorPort) {
        hw.drive_relay(cmd);
    }

    // ── Derivation ────────────────────────────────────────────

    /// Pure: the output levels the current mode calls for.
    pub fn desired_outputs(
        &self,
        battery: Option<&BatterySnapshot>,
        faults: FaultState,
    ) -> OutputState {
        let m = &self.mode;
        let coordinated = [
            m.charge_mode == ChargeMode::Fast,
            m.charge_mode == ChargeMode::Normal,
            m.power_output,
            m.power_output,
        ];
        let enables = core::array::from_fn(|i| m.enable_overrides[i].unwrap_or(coordinated[i]));

        let leds = indicators::led_outputs(
            self.policy,
            m.leds,
            battery,
            faults,
            m.charge_mode,
            self.low_battery_warning,
        );

        OutputState { enables, leds }
    }

    /// Drive every enable and LED line to its desired level.  Idempotent.
    pub fn apply(
        &self,
        hw: &mut impl ActuatorPort,
        battery: Option<&BatterySnapshot>,
        faults: FaultState,
    ) -> OutputState {
        let out = self.desired_outputs(battery, faults);
        for signal in EnableSignal::ALL {
            hw.set_enable(signal, out.enable(signal));
        }
        for led in Led::ALL {
            hw.set_led(led, out.led(led));
        }
        out
    }
}
