/*!
 * Synchronization Traits
 *
 * Result types shared by condition operations.
 */

use serde::Serialize;

/// How many waiters of a condition a signal released
///
/// A released waiter still has to reacquire the monitor before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeResult {
    /// This many waiters left the wait-set, at least one
    Woken(usize),
    /// The wait-set was empty
    NoWaiters,
}

impl WakeResult {
    #[inline]
    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }

    /// Whether the signal released anyone
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Released waiters, zero for an empty wait-set
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// Outcome of a bounded wait on a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStatus {
    /// A signal dequeued the waiter
    Signaled,
    /// The timeout elapsed first; the waiter left the wait-set on its own
    TimedOut,
}

impl WaitStatus {
    #[inline(always)]
    pub fn timed_out(&self) -> bool {
        matches!(self, WaitStatus::TimedOut)
    }
}
