//! Bank / charger / load voltage sensing.
//!
//! Each channel sits behind a resistive divider into an ADC1 input.  A
//! conversion that times out reads as 0 counts and is accepted as 0 V.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: oneshot ADC1 reads via hw_init helpers.
//! On host/test: reads from static `AtomicU16`s for injection.

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

use super::VoltageChannel;
use crate::config::SystemConfig;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_ADC: [AtomicU16; 4] = [
    AtomicU16::new(0),
    AtomicU16::new(0),
    AtomicU16::new(0),
    AtomicU16::new(0),
];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: VoltageChannel, raw: u16) {
    SIM_ADC[channel as usize].store(raw, Ordering::Relaxed);
}

/// Counts → volts at the divider input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcScaling {
    pub reference_v: f32,
    pub full_scale: u16,
    pub divider_ratio: f32,
}

impl Default for AdcScaling {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

impl AdcScaling {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            reference_v: config.adc_reference_v,
            full_scale: config.adc_full_scale,
            divider_ratio: config.voltage_divider_ratio,
        }
    }

    pub fn to_volts(&self, raw: u16) -> f32 {
        f32::from(raw) * self.reference_v / f32::from(self.full_scale) * self.divider_ratio
    }
}

pub struct VoltageSensor {
    scaling: AdcScaling,
    last: [f32; 4],
}

impl VoltageSensor {
    pub fn new(scaling: AdcScaling) -> Self {
        Self {
            scaling,
            last: [0.0; 4],
        }
    }

    /// Sample every channel once.  Result is in status-frame order.
    pub fn read_all(&mut self) -> [f32; 4] {
        for ch in VoltageChannel::SAMPLE_ORDER {
            let raw = self.read_adc(ch);
            self.last[ch as usize] = self.scaling.to_volts(raw);
        }
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self, ch: VoltageChannel) -> u16 {
        hw_init::adc1_read(pins::VOLTAGE_ADC_CHANNELS[ch as usize])
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self, ch: VoltageChannel) -> u16 {
        SIM_ADC[ch as usize].load(Ordering::Relaxed)
    }
}
