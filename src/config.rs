//! System configuration parameters
//!
//! All tunable parameters for the ESS controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// How the six indicator LEDs are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndicatorPolicy {
    /// LEDs follow host `L` commands only (plus the low-battery warning).
    #[default]
    Manual,
    /// Host states are OR-ed with gauge, charging and charger-fault indicators.
    Automatic,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Battery model ---
    /// Bank voltage reported as 0 %
    pub battery_min_voltage: f32,
    /// Bank voltage reported as 100 %
    pub battery_max_voltage: f32,
    /// Bank voltage strictly below which the battery is "low"
    pub battery_low_voltage: f32,

    // --- Fault debounce ---
    /// Quiet period after the last assertion before a fault bit clears (ms)
    pub fault_timeout_ms: u32,

    // --- Timing ---
    /// Status frame cadence, in hardware ticks (1 kHz)
    pub status_interval_ticks: u32,
    /// Latching relay coil pulse width (ms)
    pub relay_pulse_ms: u32,

    // --- ADC front-end ---
    /// ADC full-scale input voltage
    pub adc_reference_v: f32,
    /// ADC count at full scale (12-bit)
    pub adc_full_scale: u16,
    /// Resistive divider ratio ahead of every voltage channel
    pub voltage_divider_ratio: f32,

    // --- Indicators / protocol ---
    pub indicator_policy: IndicatorPolicy,
    /// Light the warning LED while the bank is low
    pub low_battery_warning: bool,
    /// Answer malformed host frames with `ERROR:` instead of dropping them silently
    pub report_rejected_commands: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Battery model
            battery_min_voltage: 11.0,
            battery_max_voltage: 14.4,
            battery_low_voltage: 11.5,

            // Fault debounce
            fault_timeout_ms: 3000,

            // Timing
            status_interval_ticks: 2000, // 2 s at 1 kHz
            relay_pulse_ms: 100,

            // ADC
            adc_reference_v: 3.3,
            adc_full_scale: 4095,
            voltage_divider_ratio: 5.0,

            indicator_policy: IndicatorPolicy::Manual,
            low_battery_warning: true,
            report_rejected_commands: false,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Used by [`ConfigPort`](crate::app::ports::ConfigPort)
    /// implementations before persisting and by `main()` after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.battery_min_voltage.is_finite() || !self.battery_max_voltage.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "battery voltage bounds must be finite",
            ));
        }
        if self.battery_min_voltage >= self.battery_max_voltage {
            return Err(ConfigError::ValidationFailed(
                "battery_min_voltage must be < battery_max_voltage",
            ));
        }
        if !(self.battery_min_voltage..=self.battery_max_voltage).contains(&self.battery_low_voltage)
        {
            return Err(ConfigError::ValidationFailed(
                "battery_low_voltage must lie within min..=max",
            ));
        }
        if self.fault_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("fault_timeout_ms must be > 0"));
        }
        if self.status_interval_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "status_interval_ticks must be > 0",
            ));
        }
        if !(1..=1000).contains(&self.relay_pulse_ms) {
            return Err(ConfigError::ValidationFailed("relay_pulse_ms must be 1-1000"));
        }
        if self.adc_reference_v.is_nan() || self.adc_reference_v <= 0.0 {
            return Err(ConfigError::ValidationFailed("adc_reference_v must be > 0"));
        }
        if self.adc_full_scale == 0 {
            return Err(ConfigError::ValidationFailed("adc_full_scale must be > 0"));
        }
        if self.voltage_divider_ratio.is_nan() || self.voltage_divider_ratio <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "voltage_divider_ratio must be > 0",
            ));
        }
        Ok(())
    }
}
