//! Inbound host commands.
//!
//! The host sends a single ASCII opcode followed by up to two ASCII-digit
//! parameters.  One receive chunk is one frame; bytes past the parameters
//! (the host's trailing `\r\n`, for instance) are ignored.
//!
//! | Opcode | Params        | Command                     |
//! |--------|---------------|-----------------------------|
//! | `S`    | none          | [`Command::Status`]         |
//! | `L`    | `<0-5><0-1>`  | [`Command::Led`]            |
//! | `C`    | `<0-2>`       | [`Command::Charge`]         |
//! | `P`    | `<0-1>`       | [`Command::Power`]          |
//! | `R`    | `<0-2>`       | [`Command::Relay`]          |
//! | `E`    | `<0-3><0-1>`  | [`Command::Enable`]         |
//!
//! Parsing is all-or-nothing: a frame with any out-of-range parameter
//! yields a [`RejectReason`] and nothing is applied.

use heapless::Vec;

use crate::control::mode::{ChargeMode, EnableSignal, Led, RelayCommand};

/// Largest receive chunk accepted as a frame.
pub const MAX_FRAME_LEN: usize = 63;

/// One received frame: opcode plus the (at most two) parameter bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub opcode: u8,
    pub params: Vec<u8, 2>,
}

impl CommandFrame {
    /// Build a frame from one receive chunk.  Empty or oversized chunks
    /// are not frames.
    pub fn from_bytes(chunk: &[u8]) -> Option<Self> {
        let (&opcode, rest) = chunk.split_first()?;
        if chunk.len() > MAX_FRAME_LEN {
            return None;
        }
        let mut params = Vec::new();
        for &b in rest.iter().take(2) {
            // Capacity is 2 and we take at most 2.
            let _ = params.push(b);
        }
        Some(Self { opcode, params })
    }

    fn param(&self, i: usize) -> Result<u8, RejectReason> {
        self.params
            .get(i)
            .copied()
            .ok_or(RejectReason::MissingParameter)
    }
}

/// A validated host request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Refresh voltages and report status now.
    Status,
    Led(Led, bool),
    Charge(ChargeMode),
    Power(bool),
    Relay(RelayCommand),
    Enable(EnableSignal, bool),
}

/// Why a frame was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnknownOpcode(u8),
    MissingParameter,
    BadParameter,
}

impl RejectReason {
    /// Text for the optional `ERROR:` reply.
    pub const fn message(self) -> &'static str {
        match self {
            Self::UnknownOpcode(_) => "UNKNOWN_COMMAND",
            Self::MissingParameter => "MISSING_PARAMETER",
            Self::BadParameter => "BAD_PARAMETER",
        }
    }
}

impl core::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownOpcode(op) => write!(f, "unknown opcode 0x{op:02x}"),
            Self::MissingParameter => write!(f, "missing parameter"),
            Self::BadParameter => write!(f, "parameter out of range"),
        }
    }
}

/// ASCII digit `b` as a number, if it is within `0..=max`.
fn digit(b: u8, max: u8) -> Result<u8, RejectReason> {
    match b.checked_sub(b'0') {
        Some(n) if n <= max => Ok(n),
        _ => Err(RejectReason::BadParameter),
    }
}

fn flag(b: u8) -> Result<bool, RejectReason> {
    digit(b, 1).map(|n| n == 1)
}

impl Command {
    pub fn parse(frame: &CommandFrame) -> Result<Self, RejectReason> {
        // Indices come from `digit` ranges, so the lookups below cannot miss.
        let bad = RejectReason::BadParameter;
        match frame.opcode {
            b'S' => Ok(Self::Status),
            b'L' => {
                let idx = digit(frame.param(0)?, 5)?;
                let on = flag(frame.param(1)?)?;
                Ok(Self::Led(Led::from_index(idx).ok_or(bad)?, on))
            }
            b'C' => {
                let mode = digit(frame.param(0)?, 2)?;
                Ok(Self::Charge(ChargeMode::from_index(mode).ok_or(bad)?))
            }
            b'P' => Ok(Self::Power(flag(frame.param(0)?)?)),
            b'R' => {
                let cmd = digit(frame.param(0)?, 2)?;
                Ok(Self::Relay(RelayCommand::from_index(cmd).ok_or(bad)?))
            }
            b'E' => {
                let idx = digit(frame.param(0)?, 3)?;
                let on = flag(frame.param(1)?)?;
                Ok(Self::Enable(EnableSignal::from_index(idx).ok_or(bad)?, on))
            }
            op => Err(RejectReason::UnknownOpcode(op)),
        }
    }

    /// Wire form of this command, as a host sends it (no terminator).
    pub fn encode(&self) -> Vec<u8, 3> {
        let (opcode, first, second) = match *self {
            Self::Status => (b'S', None, None),
            Self::Led(led, on) => (b'L', Some(led as u8), Some(u8::from(on))),
            Self::Charge(mode) => (b'C', Some(mode as u8), None),
            Self::Power(on) => (b'P', Some(u8::from(on)), None),
            Self::Relay(cmd) => (b'R', Some(cmd as u8), None),
            Self::Enable(sig, on) => (b'E', Some(sig as u8), Some(u8::from(on))),
        };
        let mut out = Vec::new();
        let digits = [first, second].into_iter().flatten().map(|n| b'0' + n);
        for b in core::iter::once(opcode).chain(digits) {
            // At most three bytes.
            let _ = out.push(b);
        }
        out
    }
}
