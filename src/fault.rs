//! Fault tracker.
//!
//! Converts the four active-low fault inputs into a debounced, sticky
//! [`FaultState`].  A bit latches as soon as its line is seen asserted and
//! clears only after the line has been quiet for longer than the configured
//! timeout (3 s by default).
//!
//! ## Concurrency
//!
//! The tracker is shared between the GPIO ISRs (which call [`set_flag`])
//! and the main loop (which calls [`check`]).  Every field is an atomic
//! and every method takes `&self`, so a `static FaultTracker` needs no
//! lock:
//!
//! - Writers stamp the timestamp **before** OR-ing the bit, so a reader that
//!   sees the bit also sees a stamp no older than the assertion.
//! - The main loop clears a stale bit with `fetch_and`, then re-reads the
//!   stamp; if an ISR re-stamped the line in between, the bit is restored.
//!   An interrupt-driven set that lands during a tick therefore always wins.
//!
//! Timestamps are milliseconds truncated to `u32` and compared with
//! `wrapping_sub`, which stays correct across the 49-day wrap.
//!
//! [`set_flag`]: FaultTracker::set_flag
//! [`check`]: FaultTracker::check

use core::fmt;
use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use log::{error, info};

use crate::error::FaultLine;

bitflags::bitflags! {
    /// Aggregate fault bitmask (`FAULT:` field of the status frame).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FaultState: u8 {
        const BLOCK_200A  = FaultLine::Block200A.mask();
        const BLOCK_100A  = FaultLine::Block100A.mask();
        const CHARGE      = FaultLine::Charge.mask();
        const FAST_CHARGE = FaultLine::FastCharge.mask();
    }
}

impl FaultState {
    /// Bitmask containing a single line.
    pub const fn from_line(line: FaultLine) -> Self {
        Self::from_bits_truncate(line.mask())
    }

    /// True if `line` is latched.
    pub const fn has(self, line: FaultLine) -> bool {
        self.bits() & line.mask() != 0
    }

    /// Latched lines in bit order.
    pub fn lines(self) -> impl Iterator<Item = FaultLine> {
        FaultLine::ALL.into_iter().filter(move |l| self.has(*l))
    }
}

impl From<FaultLine> for FaultState {
    fn from(line: FaultLine) -> Self {
        Self::from_line(line)
    }
}

impl fmt::Display for FaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Default quiet period before a latched fault clears.
pub const DEFAULT_FAULT_TIMEOUT_MS: u32 = 3000;

/// Lock-free, ISR-safe fault debounce state.
pub struct FaultTracker {
    bits: AtomicU8,
    last_asserted: [AtomicU32; 4],
    timeout_ms: AtomicU32,
}

impl Default for FaultTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FAULT_TIMEOUT_MS)
    }
}

impl FaultTracker {
    /// All lines clear.  `const` so the tracker can live in a `static`.
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            bits: AtomicU8::new(0),
            last_asserted: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
            timeout_ms: AtomicU32::new(timeout_ms),
        }
    }

    /// Replace the debounce window (applied from the next [`check`](Self::check)).
    pub fn set_timeout(&self, timeout_ms: u32) {
        self.timeout_ms.store(timeout_ms, Ordering::Relaxed);
    }

    /// Poll the raw line levels and return the updated fault state.
    ///
    /// `raw[i] == false` means line `i` is pulled low, i.e. asserted.
    /// Must be called from the main loop only.
    pub fn check(&self, now_ms: u64, raw: [bool; 4]) -> FaultState {
        let now = now_ms as u32;
        let timeout = self.timeout_ms.load(Ordering::Relaxed);

        for line in FaultLine::ALL {
            let i = line.index();
            let mask = line.mask();

            if !raw[i] {
                self.last_asserted[i].store(now, Ordering::Release);
                let prev = self.bits.fetch_or(mask, Ordering::AcqRel);
                if prev & mask == 0 {
                    error!("FAULT SET: {line}");
                }
                continue;
            }

            if self.bits.load(Ordering::Acquire) & mask == 0 {
                continue;
            }

            let stamp = self.last_asserted[i].load(Ordering::Acquire);
            if elapsed(now, stamp) <= timeout {
                continue;
            }

            self.bits.fetch_and(!mask, Ordering::AcqRel);
            if self.last_asserted[i].load(Ordering::Acquire) == stamp {
                info!("FAULT CLEARED: {line}");
            } else {
                // Re-stamped by an ISR between our read and the clear.
                self.bits.fetch_or(mask, Ordering::AcqRel);
            }
        }

        self.state()
    }

    /// Latch `faults` and restart their timeout windows.  ISR-safe.
    pub fn set_flag(&self, faults: FaultState, now_ms: u64) {
        let now = now_ms as u32;
        for line in faults.lines() {
            self.last_asserted[line.index()].store(now, Ordering::Release);
        }
        self.bits.fetch_or(faults.bits(), Ordering::AcqRel);
    }

    /// Clear `faults` immediately, without waiting for the timeout.
    pub fn clear_flag(&self, faults: FaultState) {
        self.bits.fetch_and(!faults.bits(), Ordering::AcqRel);
    }

    /// Current latched state without polling the lines.
    pub fn state(&self) -> FaultState {
        FaultState::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }
}

/// Context handed to a fault line's edge interrupt.
///
/// One binding per line is leaked at boot and its address passed as the
/// ISR argument, so the handler needs no global state.
#[derive(Clone, Copy)]
pub struct FaultIsrBinding {
    pub tracker: &'static FaultTracker,
    pub line: FaultLine,
}

impl FaultIsrBinding {
    /// Falling edge seen on `line` at `now_ms`.
    pub fn fire(&self, now_ms: u64) {
        self.tracker.set_flag(FaultState::from_line(self.line), now_ms);
    }
}

/// Milliseconds since `stamp`.  A stamp slightly ahead of `now` (an ISR
/// that read the clock after the main loop did) counts as zero.
fn elapsed(now: u32, stamp: u32) -> u32 {
    let d = now.wrapping_sub(stamp);
    if d > u32::MAX / 2 { 0 } else { d }
}
