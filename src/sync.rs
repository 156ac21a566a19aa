//! # Synchronization Primitives
//!
//! Interrupt-safe critical section abstraction. All shared scheduler state
//! (the task table, the tick counter on targets without 32-bit atomics, the
//! halt flag) is accessed within a critical section so that the dispatcher,
//! the tick interrupt and any other interrupt handler calling the control API
//! never observe a half-updated record.
//!
//! The implementation comes from the `critical-section` crate: on Cortex-M
//! it is provided by `cortex-m`'s `critical-section-single-core` feature
//! (interrupts masked on entry, restored on exit); host unit tests use the
//! crate's `std` implementation.

pub use critical_section::{CriticalSection, Mutex};

/// Execute a closure within a critical section (interrupts disabled).
///
/// Nesting is allowed. Keep the enclosed work short: on target every
/// interrupt, including the tick, is held off until the closure returns.
///
/// ```ignore
/// sync::critical_section(|cs| {
///     let mut registry = self.registry.borrow_ref_mut(cs);
///     // mutate
/// });
/// ```
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}
