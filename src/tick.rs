//! # Tick Source
//!
//! A monotonically increasing 32-bit counter advanced by exactly one writer:
//! the periodic timer interrupt. The dispatcher and the control API read it
//! from background context.
//!
//! ## Torn reads
//!
//! On targets with native 32-bit atomic read-modify-write (Armv7-M and up)
//! the counter is an `AtomicU32`. On targets without it (AVR, Armv6-M) a
//! multi-byte read can be interrupted halfway by the tick ISR, so the counter
//! lives behind a critical section instead and every read masks interrupts
//! for the duration of the copy.
//!
//! ## Wraparound
//!
//! The counter wraps after `u32::MAX` ticks (~49.7 days at 1 kHz). Deadlines
//! are compared with signed wrapping subtraction, which is correct as long
//! as a deadline is never more than `i32::MAX` ticks away from "now".

#[cfg(target_has_atomic = "32")]
use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(not(target_has_atomic = "32"))]
use core::cell::Cell;

#[cfg(not(target_has_atomic = "32"))]
use crate::sync::{self, Mutex};

/// One unit of elapsed time, as counted by the tick source.
pub type Ticks = u32;

/// Returns `true` once `now` has reached or passed `deadline`.
#[inline]
pub const fn is_due(now: Ticks, deadline: Ticks) -> bool {
    (now.wrapping_sub(deadline) as i32) >= 0
}

/// Ticks elapsed between `since` and `now`, across a counter wrap.
#[inline]
pub const fn elapsed(now: Ticks, since: Ticks) -> Ticks {
    now.wrapping_sub(since)
}

/// Milliseconds to ticks at `tick_hz`, rounded up so a delay is never
/// shorter than asked. Saturates at `Ticks::MAX`.
pub const fn ms_to_ticks(ms: u32, tick_hz: u32) -> Ticks {
    let ticks = (ms as u64 * tick_hz as u64).div_ceil(1000);
    if ticks > Ticks::MAX as u64 {
        Ticks::MAX
    } else {
        ticks as Ticks
    }
}

/// The scheduler's tick counter.
pub struct TickSource {
    #[cfg(target_has_atomic = "32")]
    ticks: AtomicU32,
    #[cfg(not(target_has_atomic = "32"))]
    ticks: Mutex<Cell<Ticks>>,
}

impl TickSource {
    pub const fn new() -> Self {
        Self {
            #[cfg(target_has_atomic = "32")]
            ticks: AtomicU32::new(0),
            #[cfg(not(target_has_atomic = "32"))]
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Current tick count.
    #[cfg(target_has_atomic = "32")]
    #[inline]
    pub fn now(&self) -> Ticks {
        self.ticks.load(Ordering::Acquire)
    }

    /// Current tick count.
    #[cfg(not(target_has_atomic = "32"))]
    #[inline]
    pub fn now(&self) -> Ticks {
        sync::critical_section(|cs| self.ticks.borrow(cs).get())
    }

    /// Advance by one tick. Only the timer interrupt should call this.
    #[cfg(target_has_atomic = "32")]
    #[inline]
    pub fn advance(&self) {
        self.ticks.fetch_add(1, Ordering::AcqRel);
    }

    /// Advance by one tick. Only the timer interrupt should call this.
    #[cfg(not(target_has_atomic = "32"))]
    #[inline]
    pub fn advance(&self) {
        sync::critical_section(|cs| {
            let ticks = self.ticks.borrow(cs);
            ticks.set(ticks.get().wrapping_add(1));
        });
    }

    /// Force the counter to `value`. Used by `init()`.
    #[cfg(target_has_atomic = "32")]
    pub fn set(&self, value: Ticks) {
        self.ticks.store(value, Ordering::Release);
    }

    /// Force the counter to `value`. Used by `init()`.
    #[cfg(not(target_has_atomic = "32"))]
    pub fn set(&self, value: Ticks) {
        sync::critical_section(|cs| self.ticks.borrow(cs).set(value));
    }

    /// Reset the counter to zero.
    pub fn reset(&self) {
        self.set(0);
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}
