//! Push-pull GPIO output exposed through `embedded-hal` traits.
//!
//! Lets the relay driver (and anything else written against
//! `embedded_hal::digital::OutputPin`) run on real pins on the target and
//! on mock pins in host tests.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the pin via hw_init helpers.
//! On host/test: tracks the level in-memory only.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

use crate::drivers::hw_init;

/// One output pin, configured (and driven low) by `hw_init`.
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
    high: bool,
}

impl GpioOutput {
    pub fn new(pin: i32) -> Self {
        Self { pin, high: false }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    /// Drive the pin to `high`.
    pub fn write(&mut self, high: bool) {
        hw_init::gpio_write(self.pin, high);
        self.high = high;
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl StatefulOutputPin for GpioOutput {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}
