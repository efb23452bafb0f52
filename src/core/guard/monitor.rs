/*!
 * Monitor Guard
 *
 * Occupancy of a monitor, tied to the monitor lock
 */

use super::traits::Guard;
use super::GuardMetadata;
use crate::core::errors::MonitorResult;
use crate::core::sync::{Inner, Monitor, WaitSet};
use parking_lot::MutexGuard;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};
use tracing::debug;

/// Scoped occupancy of a [`Monitor`]
///
/// Derefs to the protected state. Conditions take the guard as proof that
/// the caller holds the right lock. Not `Send`: a monitor is left on the
/// thread that entered it.
pub struct MonitorGuard<'a, T> {
    monitor: &'a Monitor<T>,
    inner: MutexGuard<'a, Inner<T>>,
    metadata: GuardMetadata,
    released: bool,
}

impl<'a, T> MonitorGuard<'a, T> {
    pub(crate) fn new(monitor: &'a Monitor<T>, inner: MutexGuard<'a, Inner<T>>) -> Self {
        Self {
            monitor,
            inner,
            metadata: GuardMetadata::new("monitor").with_owner(monitor.shared_name()),
            released: false,
        }
    }

    /// The monitor this guard occupies
    #[inline]
    pub fn monitor(&self) -> &'a Monitor<T> {
        self.monitor
    }

    /// Leave the monitor
    ///
    /// The invariant must hold. The lock is released whether or not it does;
    /// a broken invariant is reported as `InvariantViolation`.
    pub fn leave(mut self) -> MonitorResult<()> {
        self.released = true;
        self.monitor
            .exit(&self.inner.data, self.held_for(), true)
    }

    /// Leave the monitor and hand back `result`
    pub fn leave_with<R>(self, result: R) -> MonitorResult<R> {
        self.leave().map(|_| result)
    }

    /// Release without an invariant check (entry already failed one)
    pub(crate) fn abandon(mut self) {
        self.released = true;
        let _ = self.monitor.exit(&self.inner.data, self.held_for(), false);
    }

    #[inline]
    pub(crate) fn held_for(&self) -> Duration {
        self.metadata.creation_time.elapsed()
    }

    #[inline]
    pub(crate) fn wait_set(&mut self, index: usize) -> &mut WaitSet {
        &mut self.inner.wait_sets[index]
    }

    #[inline]
    pub(crate) fn wait_set_ref(&self, index: usize) -> &WaitSet {
        &self.inner.wait_sets[index]
    }

    /// Lock guard to park on
    #[inline]
    pub(crate) fn lock_guard(&mut self) -> &mut MutexGuard<'a, Inner<T>> {
        &mut self.inner
    }

    /// Restart the hold clock after re-acquiring the lock
    #[inline]
    pub(crate) fn reacquired(&mut self) {
        self.metadata.restart();
    }

    /// Time of entry, or of the last return from a wait
    pub fn since(&self) -> Instant {
        self.metadata.creation_time
    }
}

impl<T> Deref for MonitorGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.inner.data
    }
}

impl<T> DerefMut for MonitorGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner.data
    }
}

impl<T> Guard for MonitorGuard<'_, T> {
    fn resource_type(&self) -> &'static str {
        self.metadata.resource_type
    }

    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        !self.released
    }
}

impl<T> Drop for MonitorGuard<'_, T> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        // Violations are already logged and counted by the monitor
        if let Err(err) = self.monitor.exit(&self.inner.data, self.held_for(), true) {
            debug!(monitor = self.monitor.name(), error = %err, "implicit leave failed");
        }
    }
}
