//! # Tasker — cooperative interval scheduler
//!
//! A tiny run-to-completion task scheduler for microcontrollers. Register
//! plain `fn()` bodies with a period; a single dispatcher loop calls each
//! one whenever its deadline comes up. One periodic timer interrupt (1 kHz
//! is a good choice) drives the tick counter. There is no preemption, no
//! priority and no per-task stack.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │               Application task bodies (fn())           │
//! ├────────────────────────────────────────────────────────┤
//! │   Kernel API (kernel.rs) — one global Scheduler         │
//! │   init() · add_task() · pause/resume/modify · run()     │
//! ├──────────────────────────┬─────────────────────────────┤
//! │  Scheduler (scheduler.rs)│  Sync (sync.rs)             │
//! │  ─ control API           │  ─ critical_section()       │
//! │  ─ step() / run()        │                             │
//! │  ─ delay_ms()            │                             │
//! ├──────────────────────────┼─────────────────────────────┤
//! │  Registry (registry.rs)  │  Tick source (tick.rs)      │
//! │  fixed table + cursor    │  wrap-safe u32 counter      │
//! ├──────────────────────────┴─────────────────────────────┤
//! │      Arch port (arch/cortex_m4.rs) — SysTick → on_tick  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Task Lifecycle
//!
//! | Status | Behaviour |
//! |--------|-----------|
//! | `Scheduled` | runs every `period` ticks |
//! | `OneTime` | runs once, then leaves the table |
//! | `Paused` | kept, never dispatched until resumed |
//! | `ImmediateStart` / `OneTimeImmediateStart` | as above, first run due at once |
//!
//! Periods of `0` or above `MAX_TASK_INTERVAL` are silently replaced by
//! `DEFAULT_TASK_INTERVAL`.
//!
//! ## Example
//!
//! ```ignore
//! static SCHEDULER: Scheduler<4> = Scheduler::new();
//!
//! fn blink() { /* toggle a pin */ }
//!
//! SCHEDULER.init();
//! SCHEDULER.add_task(blink, 500, TaskStatus::Scheduled)?;
//! SCHEDULER.run(); // SysTick calls SCHEDULER.on_tick()
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: the task table is a `[Option<TaskRecord>; N]`
//! - **No `alloc`**: pure `core`
//! - **Critical sections** (`critical-section` crate) guard the table, so
//!   the control API may be called from interrupt handlers

#![no_std]

pub mod arch;
pub mod config;
pub mod error;
pub mod kernel;
pub mod registry;
pub mod scheduler;
pub mod sync;
pub mod task;
pub mod tick;

pub use error::Error;
pub use scheduler::{Scheduler, Step};
pub use task::{TaskFn, TaskId, TaskInfo, TaskStatus};
pub use tick::Ticks;
