/*!
 * Wait-Set
 *
 * FIFO queue of parked threads belonging to one condition.
 *
 * # Design: One Condvar Per Waiter
 *
 * Every waiting thread parks on its own `parking_lot::Condvar`, always paired
 * with the owning monitor's mutex. A signal pops the front handle, marks it and
 * notifies exactly that condvar, so wake order is strictly FIFO and a wakeup
 * can never be stolen by a thread that arrived later. The `signaled` flag is
 * only written while the monitor lock is held; spurious condvar wakeups simply
 * park again.
 */

use crate::core::limits::WAIT_SET_INITIAL_CAPACITY;
use parking_lot::{Condvar, MutexGuard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Handle of one blocked thread
pub(crate) struct Waiter {
    condvar: Condvar,
    signaled: AtomicBool,
}

impl Waiter {
    fn new() -> Self {
        Self {
            condvar: Condvar::new(),
            signaled: AtomicBool::new(false),
        }
    }

    #[inline]
    fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    /// Park until signaled. The mutex is released while parked and held again
    /// on return.
    pub(crate) fn park<T>(&self, guard: &mut MutexGuard<'_, T>) {
        while !self.is_signaled() {
            self.condvar.wait(guard);
        }
    }

    /// Park until signaled or until `deadline`. Returns whether a signal
    /// arrived; a signal racing the deadline still counts.
    pub(crate) fn park_until<T>(&self, guard: &mut MutexGuard<'_, T>, deadline: Instant) -> bool {
        while !self.is_signaled() {
            if self.condvar.wait_until(guard, deadline).timed_out() {
                return self.is_signaled();
            }
        }
        true
    }

    fn wake(&self) {
        self.signaled.store(true, Ordering::Release);
        self.condvar.notify_one();
    }
}

/// FIFO set of waiters, only touched under the monitor lock
pub(crate) struct WaitSet {
    queue: VecDeque<Arc<Waiter>>,
}

impl WaitSet {
    pub(crate) fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(WAIT_SET_INITIAL_CAPACITY),
        }
    }

    /// Register a new waiter at the back
    pub(crate) fn enqueue(&mut self) -> Arc<Waiter> {
        let waiter = Arc::new(Waiter::new());
        self.queue.push_back(Arc::clone(&waiter));
        waiter
    }

    /// Wake the longest-waiting thread
    pub(crate) fn wake_one(&mut self) -> bool {
        match self.queue.pop_front() {
            Some(waiter) => {
                waiter.wake();
                true
            }
            None => false,
        }
    }

    /// Wake everyone, oldest first
    pub(crate) fn wake_all(&mut self) -> usize {
        let count = self.queue.len();
        for waiter in self.queue.drain(..) {
            waiter.wake();
        }
        count
    }

    /// Drop a waiter that gave up on its own
    pub(crate) fn remove(&mut self, waiter: &Arc<Waiter>) -> bool {
        match self.queue.iter().position(|w| Arc::ptr_eq(w, waiter)) {
            Some(idx) => {
                self.queue.remove(idx);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
