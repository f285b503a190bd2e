//! Sensor subsystem: the four voltage channels and the four fault inputs,
//! aggregated by [`SensorHub`].

pub mod fault_inputs;
pub mod voltage;

use fault_inputs::FaultInputs;
use voltage::VoltageSensor;

/// Measured voltage channels, in status-frame order (`V1`..`V4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VoltageChannel {
    Load = 0,
    Charge = 1,
    BankA = 2,
    BankB = 3,
}

impl VoltageChannel {
    /// Order in which the ADC is sampled each pass.
    pub const SAMPLE_ORDER: [Self; 4] = [Self::Load, Self::BankA, Self::BankB, Self::Charge];
}

/// Owns the voltage and fault-line readers.
pub struct SensorHub {
    pub voltage: VoltageSensor,
    pub faults: FaultInputs,
}

impl SensorHub {
    pub fn new(voltage: VoltageSensor, faults: FaultInputs) -> Self {
        Self { voltage, faults }
    }

    /// Sample all four voltage channels (volts, status-frame order).
    pub fn read_voltages(&mut self) -> [f32; 4] {
        self.voltage.read_all()
    }

    /// Raw fault-line levels; `false` = asserted.
    pub fn read_fault_lines(&mut self) -> [bool; 4] {
        self.faults.read_all()
    }
}
