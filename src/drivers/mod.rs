//! Output drivers, hardware initialisation, and peripheral helpers.

pub mod delay;
pub mod gpio;
pub mod hw_init;
pub mod hw_timer;
pub mod relay;
pub mod watchdog;
