//! Fault input lines (Block200A, Block100A, Charge, FastCharge).
//!
//! Each line is open-drain from its power stage with a pull-up: HIGH is
//! healthy, LOW is asserted.  The same pins also raise falling-edge
//! interrupts (see `drivers::hw_init`), so a short pulse between two polls
//! is still captured by the fault tracker.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads real GPIO levels via hw_init helpers.
//! On host/test: defaults to all lines healthy.

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::FaultLine;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(target_os = "espidf"))]
static SIM_LINE_HIGH: [AtomicBool; 4] = [
    AtomicBool::new(true),
    AtomicBool::new(true),
    AtomicBool::new(true),
    AtomicBool::new(true),
];

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fault_line(line: FaultLine, asserted: bool) {
    SIM_LINE_HIGH[line.index()].store(!asserted, Ordering::Relaxed);
}

pub struct FaultInputs {
    last: [bool; 4],
}

impl Default for FaultInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultInputs {
    pub fn new() -> Self {
        Self { last: [true; 4] }
    }

    /// Raw levels indexed by `FaultLine::index()`; `false` = asserted.
    pub fn read_all(&mut self) -> [bool; 4] {
        for line in FaultLine::ALL {
            self.last[line.index()] = self.read_line(line);
        }
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_line(&self, line: FaultLine) -> bool {
        hw_init::gpio_read(pins::FAULT_GPIOS[line.index()])
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_line(&self, line: FaultLine) -> bool {
        SIM_LINE_HIGH[line.index()].load(Ordering::Relaxed)
    }
}
