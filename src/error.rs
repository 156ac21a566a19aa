//! Control API failures.

use core::fmt;

/// Why a control operation was refused.
///
/// An out-of-range period is not an error: it is replaced by
/// [`DEFAULT_TASK_INTERVAL`](crate::config::DEFAULT_TASK_INTERVAL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `init()` has not been called on this scheduler.
    NotInitialized,
    /// The task table already holds its capacity of tasks.
    RegistryFull,
    /// No live task has the given id.
    TaskNotFound,
}

impl Error {
    /// Raw status byte reported in place of a `TaskStatus::as_raw` code
    /// when a control operation fails. The same for every variant.
    pub const NOT_FOUND: u8 = crate::task::NOT_FOUND_CODE;
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotInitialized => write!(f, "scheduler not initialized"),
            Error::RegistryFull => write!(f, "task table full"),
            Error::TaskNotFound => write!(f, "task not found"),
        }
    }
}
