//! Unified error types for the ESS controller firmware.
//!
//! Bring-up, configuration, and transport failures all funnel into a single
//! `Error` enum so `main()` can handle them uniformly.  Domain operations
//! (fault tracking, mode setters, command dispatch) never fail: malformed
//! input is dropped, so they have no variant here.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(HwInitError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The host serial link rejected a read or write.
    Transport(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Fault lines
// ---------------------------------------------------------------------------

/// The four hardware fault inputs.
///
/// Discriminants are the bit positions used on the wire (`FAULT:` field of
/// the status frame) and inside [`FaultState`](crate::fault::FaultState).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultLine {
    /// 200 A block path reported a fault.
    Block200A = 0b0000_0001,
    /// 100 A block path reported a fault.
    Block100A = 0b0000_0010,
    /// Normal charger reported a fault.
    Charge = 0b0000_0100,
    /// Fast charger reported a fault.
    FastCharge = 0b0000_1000,
}

impl FaultLine {
    /// All lines in bit order.
    pub const ALL: [Self; 4] = [
        Self::Block200A,
        Self::Block100A,
        Self::Charge,
        Self::FastCharge,
    ];

    /// Return the bitmask for this line.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Position of this line in per-line arrays (0..=3).
    pub const fn index(self) -> usize {
        match self {
            Self::Block200A => 0,
            Self::Block100A => 1,
            Self::Charge => 2,
            Self::FastCharge => 3,
        }
    }

    /// Name used by the host application when decoding the fault mask.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Block200A => "BLOCK_200A",
            Self::Block100A => "BLOCK_100A",
            Self::Charge => "CHARGE",
            Self::FastCharge => "FAST_CHARGE",
        }
    }
}

impl fmt::Display for FaultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
