//! # Scheduler
//!
//! Cooperative, round-robin, interval-based dispatch. A `Scheduler` is a
//! self-contained context object: a tick source, a bounded task table and
//! a few flags. Several independent instances may coexist; the
//! [`kernel`](crate::kernel) module keeps one global instance for firmware
//! that wants a single process-wide scheduler.
//!
//! ## Dispatch Algorithm
//!
//! Each [`step`](Scheduler::step) visits the record under the cursor:
//! 1. **Paused** or not yet due: skip.
//! 2. **Due, Scheduled**: set `next_due = now + period`, then call the body.
//! 3. **Due, OneTime**: call the body, then drop the record.
//! 4. Advance the cursor, wrapping to the first record.
//!
//! The deadline is moved *before* the body runs, so a body that modifies
//! or removes its own task has the last word.
//!
//! Missed intervals are not replayed. If the dispatcher comes back late, the
//! task runs once and its next deadline is one period from *now*: late
//! visits produce drift, never bursts.
//!
//! ## Concurrency
//!
//! The task table lives in a critical-section mutex; every control call
//! runs entirely inside one critical section, so calls from interrupt
//! handlers are safe. Task bodies run *outside* the critical section with
//! interrupts enabled, and may call any control operation, including on
//! their own task.
//!
//! ## Constraints On Task Bodies
//!
//! There is no preemption and no watchdog here. A body that blocks starves
//! every other task. Bodies that wait on I/O should re-arm themselves with
//! `modify_task` instead of spinning.

use core::cell::{Cell, RefCell};

use crate::config::{DEFAULT_TASK_INTERVAL, MAX_TASK_INTERVAL, PAUSED_PERIOD, TICK_HZ};
use crate::error::Error;
use crate::registry::Registry;
use crate::sync::{self, Mutex};
use crate::task::{TaskFn, TaskId, TaskInfo, TaskRecord, TaskStatus};
use crate::tick::{self, TickSource, Ticks};

/// Outcome of one dispatcher visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing to visit: empty table, halted, or not initialized.
    Idle,
    /// The visited task was paused or not yet due.
    Skipped,
    /// The visited task's body was called.
    Ran(TaskId),
}

/// Flags guarded by the scheduler's critical section.
#[derive(Clone, Copy)]
struct State {
    initialized: bool,
    halted: bool,
}

/// A cooperative interval scheduler holding up to `N` tasks.
pub struct Scheduler<const N: usize> {
    ticks: TickSource,
    registry: Mutex<RefCell<Registry<N>>>,
    state: Mutex<Cell<State>>,
}

/// Replace an out-of-range period by the default.
fn sanitize_period(period: Ticks) -> Ticks {
    if period == 0 || period > MAX_TASK_INTERVAL {
        log::warn!(
            "period {} out of range, using {}",
            period,
            DEFAULT_TASK_INTERVAL
        );
        DEFAULT_TASK_INTERVAL
    } else {
        period
    }
}

impl<const N: usize> Scheduler<N> {
    /// Create an uninitialized scheduler. Call [`init`](Self::init) before
    /// anything else.
    pub const fn new() -> Self {
        Self {
            ticks: TickSource::new(),
            registry: Mutex::new(RefCell::new(Registry::new())),
            state: Mutex::new(Cell::new(State {
                initialized: false,
                halted: false,
            })),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Reset to an empty, running scheduler at tick 0.
    pub fn init(&self) {
        sync::critical_section(|cs| {
            self.registry.borrow_ref_mut(cs).clear();
            self.ticks.reset();
            self.state.borrow(cs).set(State {
                initialized: true,
                halted: false,
            });
        });
        log::debug!("scheduler ready, capacity {}", N);
    }

    pub fn is_initialized(&self) -> bool {
        sync::critical_section(|cs| self.state.borrow(cs).get().initialized)
    }

    /// Freeze the scheduler: ticks are discarded and nothing is dispatched,
    /// so every task keeps its remaining interval until [`restart`](Self::restart).
    pub fn halt(&self) {
        self.set_halted(true);
        log::debug!("scheduler halted at tick {}", self.now());
    }

    /// Undo [`halt`](Self::halt).
    pub fn restart(&self) {
        self.set_halted(false);
        log::debug!("scheduler restarted at tick {}", self.now());
    }

    pub fn is_halted(&self) -> bool {
        sync::critical_section(|cs| self.state.borrow(cs).get().halted)
    }

    fn set_halted(&self, halted: bool) {
        sync::critical_section(|cs| {
            let state = self.state.borrow(cs);
            state.set(State {
                halted,
                ..state.get()
            });
        });
    }

    // -----------------------------------------------------------------------
    // Tick source
    // -----------------------------------------------------------------------

    /// Timer interrupt hook: call exactly once per tick period.
    #[inline]
    pub fn on_tick(&self) {
        if !self.is_halted() {
            self.ticks.advance();
        }
    }

    /// Current tick count.
    #[inline]
    pub fn now(&self) -> Ticks {
        self.ticks.now()
    }

    /// Ticks elapsed since `start`, a value previously read from
    /// [`now`](Self::now). Correct across a counter wrap.
    pub fn elapsed_since(&self, start: Ticks) -> Ticks {
        tick::elapsed(self.now(), start)
    }

    // -----------------------------------------------------------------------
    // Control API
    // -----------------------------------------------------------------------

    /// Run `f` on the task table inside a critical section, refusing if the
    /// scheduler has not been initialized.
    fn with_registry<R>(
        &self,
        f: impl FnOnce(&mut Registry<N>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        sync::critical_section(|cs| {
            if !self.state.borrow(cs).get().initialized {
                return Err(Error::NotInitialized);
            }
            f(&mut self.registry.borrow_ref_mut(cs))
        })
    }

    /// Register `callback` to run every `period` ticks.
    ///
    /// A `period` of zero or above `MAX_TASK_INTERVAL` is replaced by
    /// `DEFAULT_TASK_INTERVAL`. The first run is due one period from now,
    /// or immediately for the immediate-start statuses.
    pub fn add_task(
        &self,
        callback: TaskFn,
        period: Ticks,
        status: TaskStatus,
    ) -> Result<TaskId, Error> {
        let period = sanitize_period(period);
        let id = self.with_registry(|registry| {
            if registry.is_full() {
                return Err(Error::RegistryFull);
            }
            let id = registry.allocate_id();
            registry.push(TaskRecord::new(id, callback, period, status, self.now()))?;
            Ok(id)
        })?;
        log::debug!("added {} every {} ticks ({})", id, period, status);
        Ok(id)
    }

    /// Remove a task permanently.
    pub fn remove_task(&self, id: TaskId) -> Result<(), Error> {
        self.with_registry(|registry| registry.remove(id).map(|_| ()))?;
        log::debug!("removed {}", id);
        Ok(())
    }

    /// Stop dispatching a task, keeping its record. Idempotent.
    pub fn pause_task(&self, id: TaskId) -> Result<(), Error> {
        self.with_registry(|registry| {
            let record = registry.get_mut(id).ok_or(Error::TaskNotFound)?;
            record.status = TaskStatus::Paused;
            Ok(())
        })
    }

    /// Mark a task `Scheduled` with its next run one period from now.
    pub fn resume_task(&self, id: TaskId) -> Result<(), Error> {
        self.with_registry(|registry| {
            let record = registry.get_mut(id).ok_or(Error::TaskNotFound)?;
            record.status = TaskStatus::Scheduled;
            record.reschedule(self.now());
            Ok(())
        })
    }

    /// Change a task's period and, optionally, its status.
    ///
    /// The next run is due `period` ticks from now, or immediately for the
    /// immediate-start statuses. Other out-of-range periods get the default.
    ///
    /// `PAUSED_PERIOD` is the same as [`pause_task`](Self::pause_task):
    /// `status` is ignored and the stored period and deadline are kept, so a
    /// later `resume_task` picks up the old period.
    pub fn modify_task(
        &self,
        id: TaskId,
        period: Ticks,
        status: Option<TaskStatus>,
    ) -> Result<(), Error> {
        if period == PAUSED_PERIOD {
            return self.pause_task(id);
        }
        let period = sanitize_period(period);
        self.with_registry(|registry| {
            let now = self.now();
            let record = registry.get_mut(id).ok_or(Error::TaskNotFound)?;
            record.period = period;
            let mut immediate = false;
            if let Some(status) = status {
                let (stored, now_due) = status.normalize();
                record.status = stored;
                immediate = now_due;
            }
            if immediate {
                record.next_due = now;
            } else {
                record.reschedule(now);
            }
            Ok(())
        })
    }

    /// Stored status of a task. `Err(TaskNotFound)` is the "not found"
    /// answer and never collides with a valid status.
    pub fn task_status(&self, id: TaskId) -> Result<TaskStatus, Error> {
        self.task(id).map(|info| info.status)
    }

    /// Snapshot of a task's record.
    pub fn task(&self, id: TaskId) -> Result<TaskInfo, Error> {
        self.with_registry(|registry| {
            registry
                .get(id)
                .map(TaskRecord::info)
                .ok_or(Error::TaskNotFound)
        })
    }

    /// Id of the first task (in table order) running `callback`.
    ///
    /// Tasks sharing a callback are indistinguishable here; keep the id
    /// returned by `add_task` when that matters.
    pub fn find(&self, callback: TaskFn) -> Option<TaskId> {
        self.with_registry(|registry| {
            registry
                .find_callback(callback)
                .map(|record| record.id)
                .ok_or(Error::TaskNotFound)
        })
        .ok()
    }

    /// Drop every task. The tick counter keeps running.
    pub fn clear(&self) -> Result<(), Error> {
        self.with_registry(|registry| {
            registry.clear();
            Ok(())
        })?;
        log::debug!("all tasks removed");
        Ok(())
    }

    /// Number of live tasks (0 before `init`).
    pub fn len(&self) -> usize {
        sync::critical_section(|cs| self.registry.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    // -----------------------------------------------------------------------
    // Dispatcher
    // -----------------------------------------------------------------------

    /// Visit the record under the cursor and run it if due.
    pub fn step(&self) -> Step {
        let picked = sync::critical_section(|cs| {
            let state = self.state.borrow(cs).get();
            if !state.initialized || state.halted {
                return None;
            }
            let mut registry = self.registry.borrow_ref_mut(cs);
            let now = self.now();
            let record = registry.current_mut()?;
            let picked = if record.is_due(now) {
                if record.status == TaskStatus::Scheduled {
                    record.reschedule(now);
                }
                Some((record.id, record.callback, record.status))
            } else {
                None
            };
            registry.advance_cursor();
            Some(picked)
        });

        let Some(picked) = picked else {
            return Step::Idle;
        };
        let Some((id, callback, status)) = picked else {
            return Step::Skipped;
        };

        log::trace!("dispatch {} at tick {}", id, self.now());
        callback();

        if status == TaskStatus::OneTime {
            self.retire_one_shot(id);
        }
        Step::Ran(id)
    }

    /// Drop a one-shot task after its run, unless its body re-armed it as
    /// something else or removed it already.
    fn retire_one_shot(&self, id: TaskId) {
        let retired = sync::critical_section(|cs| {
            let mut registry = self.registry.borrow_ref_mut(cs);
            let still_one_shot = registry
                .get(id)
                .is_some_and(|record| record.status == TaskStatus::OneTime);
            still_one_shot && registry.remove(id).is_ok()
        });
        if retired {
            log::debug!("one-shot {} done", id);
        }
    }

    /// Visit every live task once. Returns how many bodies ran.
    pub fn run_pass(&self) -> usize {
        let visits = self.len();
        let mut ran = 0;
        for _ in 0..visits {
            match self.step() {
                Step::Ran(_) => ran += 1,
                Step::Skipped => {}
                Step::Idle => break,
            }
        }
        ran
    }

    /// Dispatch forever.
    pub fn run(&self) -> ! {
        loop {
            self.run_pass();
        }
    }

    /// Dispatch forever, calling `idle` after every pass in which nothing
    /// ran (typically `cortex_m::asm::wfi`, woken by the next tick).
    pub fn run_with_idle<F: FnMut()>(&self, mut idle: F) -> ! {
        loop {
            if self.run_pass() == 0 {
                idle();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Busy-wait delay
    // -----------------------------------------------------------------------

    /// Spin until the counter has advanced by `ticks`.
    ///
    /// This is a blocking helper, unrelated to dispatch: called from a task
    /// body it stalls every other task for the whole delay. It never returns
    /// while the scheduler is halted.
    pub fn delay_ticks(&self, ticks: Ticks) {
        let start = self.now();
        while self.elapsed_since(start) < ticks {
            core::hint::spin_loop();
        }
    }

    /// [`delay_ticks`](Self::delay_ticks) in milliseconds, converted with
    /// `TICK_HZ` and rounded up.
    pub fn delay_ms(&self, ms: u32) {
        self.delay_ticks(tick::ms_to_ticks(ms, TICK_HZ));
    }

    #[cfg(test)]
    pub(crate) fn set_ticks(&self, value: Ticks) {
        self.ticks.set(value);
    }
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
