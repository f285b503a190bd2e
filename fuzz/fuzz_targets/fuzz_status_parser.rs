//! Fuzz target: `StatusReport::parse`
//!
//! Host-side decoder for status lines.  Arbitrary text must never panic,
//! and any line it accepts must carry in-range fields.
//!
//! cargo fuzz run fuzz_status_parser

#![no_main]

use ess_controller::app::events::StatusReport;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Some(report) = StatusReport::parse(line) {
        assert!(report.battery_level <= 100);
        assert!(report.faults.bits() <= 0x0F);
    }
});
