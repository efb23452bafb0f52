/*!
 * Condition Queues
 *
 * Condition variables bound to exactly one monitor. Every operation takes
 * the caller's `MonitorGuard` as proof that the owning monitor's lock is
 * held; a guard of any other monitor is rejected with `IllegalMonitorState`.
 *
 * # Semantics
 *
 * Mesa style: `signal` makes the longest-waiting thread runnable, the
 * signaller keeps the lock, and the woken thread re-checks its predicate
 * once it holds the lock again. `signal_and_leave` wakes all waiters and
 * leaves in one step.
 */

use super::assertion::Assertion;
use super::monitor::MonitorId;
use super::traits::{WaitStatus, WakeResult};
use crate::core::errors::{MonitorResult, Phase};
use crate::core::guard::MonitorGuard;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// A FIFO queue of threads waiting for a predicate over monitor state
///
/// Created through [`Monitor::make_condition`](super::Monitor::make_condition)
/// so it can never be bound to the wrong lock. Holds only the owning
/// monitor's id and the index of its wait-set, never the monitor itself.
pub struct Condition<T> {
    monitor_id: MonitorId,
    index: usize,
    name: Arc<str>,
    assertion: Option<Assertion<T>>,
}

impl<T> Condition<T> {
    pub(crate) fn new(
        monitor_id: MonitorId,
        index: usize,
        name: Arc<str>,
        assertion: Option<Assertion<T>>,
    ) -> Self {
        Self {
            monitor_id,
            index,
            name,
            assertion,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Guard assertion, if any
    pub fn assertion(&self) -> Option<&Assertion<T>> {
        self.assertion.as_ref()
    }

    /// Whether the guard assertion holds (conditions without one always hold)
    #[inline]
    pub fn holds(&self, state: &T) -> bool {
        self.assertion.as_ref().map_or(true, |a| a.is_true(state))
    }

    fn owned_by(&self, guard: &MonitorGuard<'_, T>) -> MonitorResult<()> {
        let monitor = guard.monitor();
        if monitor.id() == self.monitor_id {
            Ok(())
        } else {
            Err(monitor.illegal_state(format!(
                "condition `{}` belongs to monitor #{}, not #{}",
                self.name,
                self.monitor_id,
                monitor.id()
            )))
        }
    }

    /// Wait until signaled
    ///
    /// The invariant must hold on the call, since other threads may enter
    /// while this one is parked. Registers the caller at the back of the
    /// wait-set and releases the lock atomically, then blocks. The lock is
    /// held again when this returns, but the awaited predicate may be false
    /// again by then: call it in a loop.
    pub fn wait(&self, guard: &mut MonitorGuard<'_, T>) -> MonitorResult<()> {
        self.owned_by(guard)?;
        let monitor = guard.monitor();
        monitor.check_invariant(&**guard, Phase::Wait)?;

        let waiter = guard.wait_set(self.index).enqueue();
        monitor.suspend(&self.name, guard.held_for());
        trace!(monitor = monitor.name(), condition = %self.name, "parking");

        waiter.park(guard.lock_guard());

        guard.reacquired();
        monitor.resume(&self.name, false)?;
        monitor.check_invariant(&**guard, Phase::Wait)
    }

    /// Wait until signaled or until `timeout` elapses
    ///
    /// A waiter that times out removes itself from the wait-set and holds
    /// the lock again before returning `TimedOut`. A signal that dequeued the
    /// waiter always wins over the timer. A timeout too large to express as
    /// a deadline waits for a signal only.
    pub fn wait_timeout(
        &self,
        guard: &mut MonitorGuard<'_, T>,
        timeout: Duration,
    ) -> MonitorResult<WaitStatus> {
        self.owned_by(guard)?;
        let monitor = guard.monitor();
        monitor.check_invariant(&**guard, Phase::Wait)?;

        let deadline = Instant::now().checked_add(timeout);
        let waiter = guard.wait_set(self.index).enqueue();
        monitor.suspend(&self.name, guard.held_for());

        let signaled = match deadline {
            Some(deadline) => waiter.park_until(guard.lock_guard(), deadline),
            None => {
                waiter.park(guard.lock_guard());
                true
            }
        };
        if !signaled {
            guard.wait_set(self.index).remove(&waiter);
        }

        guard.reacquired();
        monitor.resume(&self.name, !signaled)?;
        monitor.check_invariant(&**guard, Phase::Wait)?;

        Ok(if signaled {
            WaitStatus::Signaled
        } else {
            WaitStatus::TimedOut
        })
    }

    /// Wait until the guard assertion holds
    ///
    /// Returns at once if it already holds (or if there is no assertion).
    pub fn wait_until(&self, guard: &mut MonitorGuard<'_, T>) -> MonitorResult<()> {
        self.owned_by(guard)?;
        while !self.holds(&**guard) {
            self.wait(guard)?;
        }
        Ok(())
    }

    /// Wake the longest-waiting thread, if any
    ///
    /// The guard assertion must hold when there is someone to wake.
    pub fn signal(&self, guard: &mut MonitorGuard<'_, T>) -> MonitorResult<WakeResult> {
        self.owned_by(guard)?;
        if guard.wait_set_ref(self.index).is_empty() {
            return Ok(WakeResult::NoWaiters);
        }
        self.check_before_signal(guard)?;

        guard.wait_set(self.index).wake_one();
        guard.monitor().signaled(&self.name, 1);
        Ok(WakeResult::Woken(1))
    }

    /// Wake every waiting thread, oldest first
    pub fn signal_all(&self, guard: &mut MonitorGuard<'_, T>) -> MonitorResult<WakeResult> {
        self.owned_by(guard)?;
        if guard.wait_set_ref(self.index).is_empty() {
            return Ok(WakeResult::NoWaiters);
        }
        self.check_before_signal(guard)?;

        let woken = guard.wait_set(self.index).wake_all();
        guard.monitor().signaled(&self.name, woken);
        Ok(WakeResult::from_count(woken))
    }

    /// Wake every waiting thread and leave the monitor
    pub fn signal_and_leave(&self, mut guard: MonitorGuard<'_, T>) -> MonitorResult<WakeResult> {
        let woken = self.signal_all(&mut guard)?;
        guard.monitor().signaller_leaves(&self.name);
        guard.leave()?;
        Ok(woken)
    }

    /// Whether no thread is waiting on this condition
    pub fn is_empty(&self, guard: &MonitorGuard<'_, T>) -> MonitorResult<bool> {
        self.owned_by(guard)?;
        Ok(guard.wait_set_ref(self.index).is_empty())
    }

    /// Number of threads waiting on this condition
    pub fn len(&self, guard: &MonitorGuard<'_, T>) -> MonitorResult<usize> {
        self.owned_by(guard)?;
        Ok(guard.wait_set_ref(self.index).len())
    }

    fn check_before_signal(&self, guard: &MonitorGuard<'_, T>) -> MonitorResult<()> {
        match &self.assertion {
            Some(assertion) => guard
                .monitor()
                .check_assertion(&self.name, assertion, &**guard),
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("name", &self.name)
            .field("monitor_id", &self.monitor_id)
            .field("assertion", &self.assertion.as_ref().map(|a| a.name()))
            .finish()
    }
}
