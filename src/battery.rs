//! Voltage / battery model.
//!
//! Pure functions only: the caller decides what to do with the low-battery
//! flag (see [`control::indicators`](crate::control::indicators)).

use crate::config::SystemConfig;
use crate::sensors::VoltageChannel;

/// Voltages from one sampling pass plus the derived battery figures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BatterySnapshot {
    /// Indexed by [`VoltageChannel`]: Load, Charge, BankA, BankB.
    pub voltages: [f32; 4],
    /// 0–100 %, from the BankA voltage.
    pub battery_level: u8,
    pub low_battery: bool,
}

impl BatterySnapshot {
    pub fn voltage(&self, channel: VoltageChannel) -> f32 {
        self.voltages[channel as usize]
    }
}

/// Piecewise-linear state-of-charge estimate from a single bank voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryModel {
    min_v: f32,
    max_v: f32,
    low_v: f32,
}

impl Default for BatteryModel {
    fn default() -> Self {
        Self::new(&SystemConfig::default())
    }
}

impl BatteryModel {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_v: config.battery_min_voltage,
            max_v: config.battery_max_voltage,
            low_v: config.battery_low_voltage,
        }
    }

    /// Map `voltage` to 0–100 %, clamped at both ends, truncated toward zero.
    pub fn calculate_level(&self, voltage: f32) -> u8 {
        if voltage <= self.min_v {
            return 0;
        }
        if voltage >= self.max_v {
            return 100;
        }
        let level = ((voltage - self.min_v) / (self.max_v - self.min_v) * 100.0) as i32;
        level.clamp(0, 100) as u8
    }

    /// Strictly below the low threshold.
    pub fn is_low(&self, voltage: f32) -> bool {
        voltage < self.low_v
    }

    /// Derive the battery figures for a fresh set of channel voltages.
    pub fn snapshot(&self, voltages: [f32; 4]) -> BatterySnapshot {
        let bank = voltages[VoltageChannel::BankA as usize];
        BatterySnapshot {
            voltages,
            battery_level: self.calculate_level(bank),
            low_battery: self.is_low(bank),
        }
    }
}
