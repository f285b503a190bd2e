//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and every output driver, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::config::SystemConfig;
use crate::control::mode::{EnableSignal, Led, RelayCommand};
use crate::drivers::delay::{platform_delay, PlatformDelay};
use crate::drivers::gpio::GpioOutput;
use crate::drivers::relay::LatchRelay;
use crate::pins;
use crate::sensors::fault_inputs::FaultInputs;
use crate::sensors::voltage::{AdcScaling, VoltageSensor};
use crate::sensors::SensorHub;

type Relay = LatchRelay<GpioOutput, GpioOutput, PlatformDelay>;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    enables: [GpioOutput; 4],
    leds: [GpioOutput; 6],
    relay: Relay,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, enables: [GpioOutput; 4], leds: [GpioOutput; 6], relay: Relay) -> Self {
        Self {
            sensor_hub,
            enables,
            leds,
            relay,
        }
    }

    /// Wire every pin from [`pins`] with the configured scaling and pulse width.
    pub fn from_config(config: &SystemConfig) -> Self {
        let sensor_hub = SensorHub::new(
            VoltageSensor::new(AdcScaling::from_config(config)),
            FaultInputs::new(),
        );
        let relay = LatchRelay::new(
            GpioOutput::new(pins::LATCH_IN1_GPIO),
            GpioOutput::new(pins::LATCH_IN2_GPIO),
            platform_delay(),
            config.relay_pulse_ms,
        );
        Self::new(
            sensor_hub,
            pins::ENABLE_GPIOS.map(GpioOutput::new),
            pins::LED_GPIOS.map(GpioOutput::new),
            relay,
        )
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_voltages(&mut self) -> [f32; 4] {
        self.sensor_hub.read_voltages()
    }

    fn read_fault_lines(&mut self) -> [bool; 4] {
        self.sensor_hub.read_fault_lines()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_enable(&mut self, signal: EnableSignal, on: bool) {
        self.enables[signal as usize].write(on);
    }

    fn set_led(&mut self, led: Led, on: bool) {
        self.leds[led as usize].write(on);
    }

    fn drive_relay(&mut self, cmd: RelayCommand) {
        self.relay
            .actuate(cmd)
            .unwrap_or_else(|e| warn!("relay: {:?} failed: {:?}", cmd, e));
    }

    fn all_off(&mut self) {
        for pin in self.enables.iter_mut().chain(self.leds.iter_mut()) {
            pin.write(false);
        }
        self.drive_relay(RelayCommand::Off);
    }
}
