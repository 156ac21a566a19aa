//! # Tasker Configuration
//!
//! Compile-time constants governing the scheduler and system behavior.
//! All limits are fixed at compile time — no dynamic allocation.

use crate::tick::Ticks;

/// Capacity of the task table used by the global [`kernel`](crate::kernel)
/// instance. Each slot costs one `TaskRecord` (a function pointer and
/// four words) of RAM. Standalone schedulers pick their own capacity
/// through the `N` parameter of [`Scheduler`](crate::scheduler::Scheduler).
pub const MAX_TASKS: usize = 8;

/// Largest accepted task period, in ticks (one hour at 1 kHz).
pub const MAX_TASK_INTERVAL: Ticks = 3_600_000;

/// Period substituted when a caller asks for `0` or for more than
/// `MAX_TASK_INTERVAL`.
pub const DEFAULT_TASK_INTERVAL: Ticks = 50;

/// Period sentinel meaning "paused / not scheduled". Accepted by
/// `modify_task`; never stored in a record.
pub const PAUSED_PERIOD: Ticks = Ticks::MAX;

/// SysTick frequency in Hz. At 1 kHz one tick is one millisecond.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;
