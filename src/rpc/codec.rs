//! Line-oriented frame codec for the host serial link.
//!
//! Wire format (ASCII, CRLF-terminated):
//! ```text
//! BAT:<0-100>,STATE:<0-3>,FAULT:<0-255>,V1:<mV>,V2:<mV>,V3:<mV>,V4:<mV>\r\n
//! ERROR:<message>\r\n
//! ```
//!
//! V1..V4 are Load, Charge, BankA, BankB in millivolts, truncated toward
//! zero.  Encoding never allocates; output goes into fixed-capacity
//! `heapless::String`s.

use core::fmt::Write;

use heapless::String;

use crate::app::events::{StatusReport, SystemState};
use crate::fault::FaultState;

/// Capacity of an encoded status line (worst case is ~90 bytes).
pub const STATUS_LINE_CAP: usize = 128;

/// Capacity of an encoded error line.
pub const ERROR_LINE_CAP: usize = 64;

pub type StatusLine = String<STATUS_LINE_CAP>;
pub type ErrorLine = String<ERROR_LINE_CAP>;

/// Volts → integer millivolts, truncated toward zero.
pub fn millivolts(v: f32) -> i32 {
    (v * 1000.0) as i32
}

/// Render a status frame.
pub fn encode_status(report: &StatusReport) -> StatusLine {
    let mut out = StatusLine::new();
    let [v1, v2, v3, v4] = report.voltages.map(millivolts);
    // Cannot overflow: every field is bounded.
    let _ = write!(
        out,
        "BAT:{},STATE:{},FAULT:{},V1:{},V2:{},V3:{},V4:{}\r\n",
        report.battery_level,
        report.state as u8,
        report.faults.bits(),
        v1,
        v2,
        v3,
        v4,
    );
    out
}

/// Render an error frame.  Over-long messages are truncated so the CRLF
/// always fits.
pub fn encode_error(message: &str) -> ErrorLine {
    let mut out = ErrorLine::new();
    let _ = out.push_str("ERROR:");
    let room = ERROR_LINE_CAP - out.len() - 2;
    let mut end = message.len().min(room);
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    let _ = out.push_str(&message[..end]);
    let _ = out.push_str("\r\n");
    out
}

impl StatusReport {
    /// Decode a status line as received by a host.  Returns `None` for
    /// anything that is not a complete, well-formed status frame.
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim_end_matches(['\r', '\n']);
        let mut fields = body.split(',');
        let mut next = |key: &str| -> Option<i64> {
            let (k, v) = fields.next()?.split_once(':')?;
            if k != key {
                return None;
            }
            v.parse().ok()
        };

        let battery_level = u8::try_from(next("BAT")?).ok().filter(|l| *l <= 100)?;
        let state = SystemState::from_index(u8::try_from(next("STATE")?).ok()?)?;
        let faults = FaultState::from_bits(u8::try_from(next("FAULT")?).ok()?)?;
        let mut voltages = [0.0f32; 4];
        for (i, key) in ["V1", "V2", "V3", "V4"].into_iter().enumerate() {
            voltages[i] = next(key)? as f32 / 1000.0;
        }
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            battery_level,
            state,
            faults,
            voltages,
        })
    }
}
