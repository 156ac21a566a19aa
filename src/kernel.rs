//! # Kernel
//!
//! A process-wide [`Scheduler`] for firmware that wants exactly one, plus a
//! free-function API over it. Everything here forwards to [`KERNEL`]; code
//! that needs several schedulers, or a different capacity, should own a
//! `Scheduler<N>` instead.
//!
//! ## Startup Sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init()          ← Empty table, tick 0
//!         ├─► kernel::add_task() ×N   ← Register periodic / one-shot bodies
//!         ├─► configure_systick()     ← SysTick exception calls kernel::on_tick()
//!         └─► kernel::run()           ← Dispatch forever (no return)
//! ```

use crate::config::MAX_TASKS;
use crate::error::Error;
use crate::scheduler::Scheduler;
use crate::task::{TaskFn, TaskId, TaskStatus};
use crate::tick::Ticks;

/// The global scheduler instance.
pub static KERNEL: Scheduler<MAX_TASKS> = Scheduler::new();

/// Reset the global scheduler. Must be called before any other kernel
/// function; until then they all return `Error::NotInitialized`.
pub fn init() {
    KERNEL.init();
}

/// Timer interrupt hook. Call once per tick from the SysTick handler.
#[inline]
pub fn on_tick() {
    KERNEL.on_tick();
}

/// Current tick count of the global scheduler.
#[inline]
pub fn now() -> Ticks {
    KERNEL.now()
}

pub fn add_task(callback: TaskFn, period: Ticks, status: TaskStatus) -> Result<TaskId, Error> {
    KERNEL.add_task(callback, period, status)
}

pub fn remove_task(id: TaskId) -> Result<(), Error> {
    KERNEL.remove_task(id)
}

pub fn pause_task(id: TaskId) -> Result<(), Error> {
    KERNEL.pause_task(id)
}

pub fn resume_task(id: TaskId) -> Result<(), Error> {
    KERNEL.resume_task(id)
}

pub fn modify_task(id: TaskId, period: Ticks, status: Option<TaskStatus>) -> Result<(), Error> {
    KERNEL.modify_task(id, period, status)
}

pub fn task_status(id: TaskId) -> Result<TaskStatus, Error> {
    KERNEL.task_status(id)
}

pub fn find(callback: TaskFn) -> Option<TaskId> {
    KERNEL.find(callback)
}

/// Drop every task of the global scheduler.
pub fn clear() -> Result<(), Error> {
    KERNEL.clear()
}

pub fn halt() {
    KERNEL.halt();
}

pub fn restart() {
    KERNEL.restart();
}

/// Busy-wait `ms` milliseconds. Stalls every task while it spins.
pub fn delay_ms(ms: u32) {
    KERNEL.delay_ms(ms);
}

/// Start dispatching. **Does not return.**
pub fn run() -> ! {
    KERNEL.run()
}

/// Start dispatching, calling `idle` whenever a full pass ran nothing.
/// **Does not return.**
pub fn run_with_idle<F: FnMut()>(idle: F) -> ! {
    KERNEL.run_with_idle(idle)
}
