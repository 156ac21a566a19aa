//! # Task Records
//!
//! Defines the task model for Tasker. A task is a plain `fn()` run every
//! `period` ticks by the dispatcher. There is no stack, no context and no
//! priority: a task body runs to completion on the dispatcher's stack and
//! must return quickly.

use core::fmt;

use crate::tick::{self, Ticks};

/// Unit of dispatch. Must be short-running and must not block: a body that
/// never returns starves every other task.
pub type TaskFn = fn();

/// Raw status byte meaning "no such task".
pub const NOT_FOUND_CODE: u8 = 0xFF;

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Scheduling status of a task.
///
/// A stored record is always `Paused`, `Scheduled` or `OneTime`. The two
/// immediate-start variants are creation-time modifiers: they collapse to
/// `Scheduled` / `OneTime` with the first run due at once.
///
/// Discriminants keep the classic bit layout: bit 0 = periodic, bit 1 =
/// one-shot, bit 2 = start immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskStatus {
    /// Kept in the table but never dispatched until resumed.
    Paused = 0x00,
    /// Runs every period, first run one period after registration.
    Scheduled = 0x01,
    /// Runs once, one period after registration, then leaves the table.
    OneTime = 0x02,
    /// Like `Scheduled`, but the first run is due immediately.
    ImmediateStart = 0x05,
    /// Like `OneTime`, but the single run is due immediately.
    OneTimeImmediateStart = 0x07,
}

impl TaskStatus {
    const IMMEDIATE_BIT: u8 = 0x04;
    const KIND_MASK: u8 = 0x03;

    /// Decode a raw status byte. Unknown codes fall back to `Scheduled`.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => TaskStatus::Paused,
            0x01 => TaskStatus::Scheduled,
            0x02 => TaskStatus::OneTime,
            0x05 => TaskStatus::ImmediateStart,
            0x07 => TaskStatus::OneTimeImmediateStart,
            _ => TaskStatus::Scheduled,
        }
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Whether the first run is due at registration time.
    pub const fn is_immediate(self) -> bool {
        self.as_raw() & Self::IMMEDIATE_BIT != 0
    }

    /// Split into the status that is actually stored and the
    /// immediate-start flag.
    pub const fn normalize(self) -> (TaskStatus, bool) {
        let stored = match self.as_raw() & Self::KIND_MASK {
            0x00 => TaskStatus::Paused,
            0x02 | 0x03 => TaskStatus::OneTime,
            _ => TaskStatus::Scheduled,
        };
        (stored, self.is_immediate())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Paused => write!(f, "paused"),
            TaskStatus::Scheduled => write!(f, "scheduled"),
            TaskStatus::OneTime => write!(f, "one-time"),
            TaskStatus::ImmediateStart => write!(f, "immediate"),
            TaskStatus::OneTimeImmediateStart => write!(f, "one-time immediate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Task identity
// ---------------------------------------------------------------------------

/// Handle returned by `add_task`.
///
/// Unique among the live tasks of one scheduler and unaffected by the
/// removal of other tasks. Two tasks sharing a callback still get distinct
/// ids.
///
/// Ids come from a 64-bit counter that survives `clear()` and `init()`, so
/// the handle of a removed task stays stale: it can only name a new task
/// after 2^64 further allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) const fn new(raw: u64) -> Self {
        TaskId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "T{:03}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Task record
// ---------------------------------------------------------------------------

/// One entry of the task table.
#[derive(Clone, Copy)]
pub struct TaskRecord {
    pub id: TaskId,
    pub callback: TaskFn,
    /// Ticks between runs.
    pub period: Ticks,
    /// Absolute tick of the next run.
    pub next_due: Ticks,
    /// Always `Paused`, `Scheduled` or `OneTime`.
    pub status: TaskStatus,
}

impl TaskRecord {
    /// Build a record registered at tick `now`. `status` is normalized and
    /// the first deadline is `now`, or `now + period` for delayed starts.
    pub fn new(id: TaskId, callback: TaskFn, period: Ticks, status: TaskStatus, now: Ticks) -> Self {
        let (status, immediate) = status.normalize();
        Self {
            id,
            callback,
            period,
            next_due: if immediate { now } else { now.wrapping_add(period) },
            status,
        }
    }

    /// Dispatchable at `now`: not paused and deadline reached.
    #[inline]
    pub fn is_due(&self, now: Ticks) -> bool {
        self.status != TaskStatus::Paused && tick::is_due(now, self.next_due)
    }

    /// Next run one period from `now`.
    #[inline]
    pub fn reschedule(&mut self, now: Ticks) {
        self.next_due = now.wrapping_add(self.period);
    }

    pub fn runs_callback(&self, callback: TaskFn) -> bool {
        core::ptr::fn_addr_eq(self.callback, callback)
    }

    pub fn info(&self) -> TaskInfo {
        TaskInfo {
            id: self.id,
            callback: self.callback,
            period: self.period,
            next_due: self.next_due,
            status: self.status,
        }
    }
}

impl fmt::Debug for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("period", &self.period)
            .field("next_due", &self.next_due)
            .field("status", &self.status)
            .finish()
    }
}

/// Read-only snapshot of a task, as returned by `Scheduler::task`.
#[derive(Debug, Clone, Copy)]
pub struct TaskInfo {
    pub id: TaskId,
    pub callback: TaskFn,
    pub period: Ticks,
    pub next_due: Ticks,
    pub status: TaskStatus,
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn body() {}

    #[test]
    fn test_status_normalization() {
        assert_eq!(TaskStatus::Paused.normalize(), (TaskStatus::Paused, false));
        assert_eq!(TaskStatus::Scheduled.normalize(), (TaskStatus::Scheduled, false));
        assert_eq!(TaskStatus::OneTime.normalize(), (TaskStatus::OneTime, false));
        assert_eq!(TaskStatus::ImmediateStart.normalize(), (TaskStatus::Scheduled, true));
        assert_eq!(
            TaskStatus::OneTimeImmediateStart.normalize(),
            (TaskStatus::OneTime, true)
        );
    }

    #[test]
    fn test_unknown_raw_status_is_scheduled() {
        assert_eq!(TaskStatus::from_raw(0x05), TaskStatus::ImmediateStart);
        assert_eq!(TaskStatus::from_raw(0x03), TaskStatus::Scheduled);
        assert_eq!(TaskStatus::from_raw(0x42), TaskStatus::Scheduled);
        assert_eq!(TaskStatus::from_raw(NOT_FOUND_CODE), TaskStatus::Scheduled);
        assert_eq!(TaskStatus::OneTime.as_raw(), 0x02);
    }

    #[test]
    fn test_record_deadlines() {
        let delayed = TaskRecord::new(TaskId::new(1), body, 100, TaskStatus::Scheduled, 10);
        assert_eq!(delayed.next_due, 110);
        assert!(!delayed.is_due(109));
        assert!(delayed.is_due(110));

        let immediate = TaskRecord::new(TaskId::new(2), body, 100, TaskStatus::ImmediateStart, 10);
        assert_eq!(immediate.status, TaskStatus::Scheduled);
        assert_eq!(immediate.next_due, 10);
        assert!(immediate.is_due(10));
    }

    #[test]
    fn test_paused_record_is_never_due() {
        let mut record = TaskRecord::new(TaskId::new(3), body, 5, TaskStatus::Paused, 0);
        assert!(!record.is_due(5));
        assert!(!record.is_due(1_000_000));
        record.status = TaskStatus::Scheduled;
        assert!(record.is_due(5));
    }

    #[test]
    fn test_reschedule_wraps() {
        let mut record = TaskRecord::new(TaskId::new(4), body, 20, TaskStatus::Scheduled, 0);
        record.reschedule(u32::MAX - 9);
        assert_eq!(record.next_due, 10);
        assert!(!record.is_due(u32::MAX));
        assert!(record.is_due(10));
    }

    #[test]
    fn test_task_id_display() {
        extern crate std;
        use std::string::ToString;
        assert_eq!(TaskId::new(7).to_string(), "T007");
    }
}
