//! Fuzz target: `CommandFrame::from_bytes` + `Command::parse`
//!
//! Drives arbitrary receive chunks through framing and parsing and asserts
//! that neither panics and that every accepted command re-encodes to a
//! frame that parses back to itself.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use ess_controller::app::commands::{Command, CommandFrame, MAX_FRAME_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(frame) = CommandFrame::from_bytes(data) else {
        assert!(data.is_empty() || data.len() > MAX_FRAME_LEN);
        return;
    };
    assert!(frame.params.len() <= 2);

    if let Ok(cmd) = Command::parse(&frame) {
        let wire = cmd.encode();
        let again = CommandFrame::from_bytes(&wire).expect("encoded frame is non-empty");
        assert_eq!(Command::parse(&again), Ok(cmd));
    }
});
