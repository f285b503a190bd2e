//! Bistable (dual-coil) latching relay driver.
//!
//! The latch holds its contacts without coil power, so each switch is a
//! single timed pulse on one coil:
//!
//! ```text
//!  Set:    IN2 ▁▁▁▁▁▁▁▁▁▁   IN1 ▁▁▔▔▔▔▔▔▁▁   (pulse_ms)
//!  Reset:  IN1 ▁▁▁▁▁▁▁▁▁▁   IN2 ▁▁▔▔▔▔▔▔▁▁
//!  Off:    IN1 ▁▁▁▁▁▁▁▁▁▁   IN2 ▁▁▁▁▁▁▁▁▁▁
//! ```
//!
//! The opposite coil is always released first, and both coils end low.
//! The pulse **blocks** the caller for its whole width.  The latch position
//! is not tracked.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::debug;

use crate::control::mode::RelayCommand;

/// Default coil pulse width.
pub const DEFAULT_PULSE_MS: u32 = 100;

pub struct LatchRelay<IN1, IN2, D> {
    in1: IN1,
    in2: IN2,
    delay: D,
    pulse_ms: u32,
}

impl<IN1, IN2, D> LatchRelay<IN1, IN2, D>
where
    IN1: OutputPin,
    IN2: OutputPin<Error = IN1::Error>,
    D: DelayNs,
{
    pub fn new(in1: IN1, in2: IN2, delay: D, pulse_ms: u32) -> Self {
        Self {
            in1,
            in2,
            delay,
            pulse_ms,
        }
    }

    /// Execute `cmd`.  `Set`/`Reset` return after the coil is released.
    pub fn actuate(&mut self, cmd: RelayCommand) -> Result<(), IN1::Error> {
        match cmd {
            RelayCommand::Off => {
                self.in1.set_low()?;
                self.in2.set_low()?;
            }
            RelayCommand::Set => {
                self.in2.set_low()?;
                self.in1.set_high()?;
                self.delay.delay_ms(self.pulse_ms);
                self.in1.set_low()?;
            }
            RelayCommand::Reset => {
                self.in1.set_low()?;
                self.in2.set_high()?;
                self.delay.delay_ms(self.pulse_ms);
                self.in2.set_low()?;
            }
        }
        debug!("relay: {:?} done ({} ms pulse)", cmd, self.pulse_ms);
        Ok(())
    }

    pub fn pulse_ms(&self) -> u32 {
        self.pulse_ms
    }

    /// Release the pins and delay provider.
    pub fn free(self) -> (IN1, IN2, D) {
        (self.in1, self.in2, self.delay)
    }
}
