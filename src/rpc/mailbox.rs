//! Single-slot command mailbox between the receive path and the main loop.
//!
//! ```text
//! ┌──────────────┐  CommandFrame  ┌──────────────┐
//! │ USB receive  │──── post ────▶│  Main loop    │
//! │ (poll / cb)  │  last wins     │  take → parse │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! Exactly one frame may be pending.  A frame that arrives before the
//! previous one was drained replaces it; there is no queue.  Built on
//! `embassy-sync`'s `Signal`, whose `try_take` reads and clears the slot
//! in one critical section.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::app::commands::CommandFrame;

pub struct CommandMailbox {
    slot: Signal<CriticalSectionRawMutex, CommandFrame>,
}

impl Default for CommandMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandMailbox {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Store a frame, replacing any frame still pending.
    pub fn post(&self, frame: CommandFrame) {
        self.slot.signal(frame);
    }

    /// Remove and return the pending frame, if any.
    pub fn take(&self) -> Option<CommandFrame> {
        self.slot.try_take()
    }

}
