//! Tick counter and periodic cadence.
//!
//! ```text
//!  1 kHz esp_timer ──▶ TickCounter::increment()   (timer task)
//!                            │
//!                            ▼  now()
//!  main loop ──▶ PeriodicTimer::should_fire(now) ──▶ status frame
//! ```
//!
//! The counter is a `u32` and wraps after ~49 days.  All comparisons use
//! `now.wrapping_sub(last)`, which is correct across the wrap for any
//! interval below `u32::MAX`.

use core::sync::atomic::{AtomicU32, Ordering};

// ═══════════════════════════════════════════════════════════════
//  Tick counter
// ═══════════════════════════════════════════════════════════════

/// Free-running hardware tick count, incremented from the timer callback.
pub struct TickCounter {
    ticks: AtomicU32,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance by one tick.  ISR / timer-task safe.
    pub fn increment(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Advance by `n` ticks (host simulation).
    pub fn advance(&self, n: u32) {
        self.ticks.fetch_add(n, Ordering::Relaxed);
    }

    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Periodic timer
// ═══════════════════════════════════════════════════════════════

/// Fires once per `interval` ticks, measured from its last firing.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    last_tick: u32,
    interval: u32,
}

impl PeriodicTimer {
    /// `start` is the reference tick the first window is measured from.
    pub const fn new(interval: u32, start: u32) -> Self {
        Self {
            last_tick: start,
            interval,
        }
    }

    /// True once more than `interval` ticks have passed since the last
    /// `true`; the reference point then moves to `now`.
    pub fn should_fire(&mut self, now: u32) -> bool {
        if now.wrapping_sub(self.last_tick) > self.interval {
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
