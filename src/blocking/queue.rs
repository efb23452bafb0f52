/*!
 * Bounded Queue
 *
 * Fixed-capacity FIFO built on one monitor and two conditions. Producers
 * block while the queue is full, consumers while it is empty; neither case
 * is an error.
 */

use crate::core::errors::{MonitorError, MonitorResult};
use crate::core::sync::{Assertion, Condition, Invariant, Monitor, MonitorConfig};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

/// Circular buffer protected by a [`BoundedQueue`]'s monitor
///
/// Only the counters are visible outside the crate.
pub struct Ring<T> {
    slots: Vec<Option<T>>,
    front: usize,
    count: usize,
}

impl<T> Ring<T> {
    fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            front: 0,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn has_room(&self) -> bool {
        !self.is_full()
    }

    fn has_items(&self) -> bool {
        !self.is_empty()
    }

    /// Exactly `count` slots are filled, starting at `front`
    fn slots_match_count(&self) -> bool {
        let capacity = self.slots.len();
        self.slots.iter().enumerate().all(|(i, slot)| {
            let offset = (i + capacity - self.front) % capacity;
            slot.is_some() == (offset < self.count)
        })
    }

    /// Store at the back. Caller has checked there is room.
    fn push(&mut self, value: T) {
        let back = (self.front + self.count) % self.slots.len();
        self.slots[back] = Some(value);
        self.count += 1;
    }

    /// Take from the front, if anything is stored
    fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let value = self.slots[self.front].take();
        self.front = (self.front + 1) % self.slots.len();
        self.count -= 1;
        value
    }
}

impl<T> Invariant for Ring<T> {
    fn invariant_name(&self) -> &'static str {
        "count <= capacity, front < capacity, count slots filled from front"
    }

    fn holds(&self) -> bool {
        let capacity = self.slots.len();
        if self.count > capacity || self.front >= capacity {
            return false;
        }
        // Slot scan is linear in capacity; debug builds only
        !cfg!(debug_assertions) || self.slots_match_count()
    }

    fn summary(&self) -> String {
        format!(
            "count={} front={} capacity={}",
            self.count,
            self.front,
            self.slots.len()
        )
    }
}

/// Blocking bounded FIFO queue
///
/// # Example
///
/// ```
/// use monitor_object::blocking::BoundedQueue;
///
/// let queue = BoundedQueue::new(2).unwrap();
/// queue.deposit("a").unwrap();
/// queue.deposit("b").unwrap();
/// assert_eq!(queue.fetch().unwrap(), "a");
/// assert_eq!(queue.len().unwrap(), 1);
/// ```
pub struct BoundedQueue<T> {
    monitor: Monitor<Ring<T>>,
    not_full: Condition<Ring<T>>,
    not_empty: Condition<Ring<T>>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Queue holding at most `capacity` items
    pub fn new(capacity: usize) -> MonitorResult<Self> {
        Self::with_config(capacity, MonitorConfig::named("bounded_queue"))
    }

    pub fn with_config(capacity: usize, config: MonitorConfig) -> MonitorResult<Self> {
        if capacity == 0 {
            return Err(MonitorError::InvalidCapacity(capacity));
        }

        let monitor = Monitor::guarded(config, Ring::new(capacity));
        let not_full = monitor.make_condition_with(
            "not_full",
            Assertion::from_fn("count < capacity", Ring::<T>::has_room),
        );
        let not_empty = monitor.make_condition_with(
            "not_empty",
            Assertion::from_fn("count > 0", Ring::<T>::has_items),
        );

        Ok(Self {
            monitor,
            not_full,
            not_empty,
            capacity,
        })
    }

    /// Append `value`, blocking while the queue is full
    pub fn deposit(&self, value: T) -> MonitorResult<()> {
        let mut guard = self.monitor.enter()?;
        while guard.is_full() {
            self.not_full.wait(&mut guard)?;
        }

        guard.push(value);
        trace!(queue = self.monitor.name(), len = guard.len(), "deposited");
        self.not_empty.signal(&mut guard)?;
        guard.leave()
    }

    /// Remove the oldest item, blocking while the queue is empty
    pub fn fetch(&self) -> MonitorResult<T> {
        let mut guard = self.monitor.enter()?;
        let value = loop {
            if let Some(value) = guard.pop() {
                break value;
            }
            self.not_empty.wait(&mut guard)?;
        };

        trace!(queue = self.monitor.name(), len = guard.len(), "fetched");
        self.not_full.signal(&mut guard)?;
        guard.leave_with(value)
    }

    /// Like [`fetch`](Self::fetch), but gives up with `None` once `timeout`
    /// has elapsed without an item
    ///
    /// A timeout too large to express as a deadline behaves like `fetch`.
    pub fn fetch_timeout(&self, timeout: Duration) -> MonitorResult<Option<T>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.monitor.enter()?;

        let value = loop {
            if let Some(value) = guard.pop() {
                break Some(value);
            }
            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break None;
                    }
                    self.not_empty.wait_timeout(&mut guard, deadline - now)?;
                }
                None => self.not_empty.wait(&mut guard)?,
            }
        };

        if value.is_some() {
            self.not_full.signal(&mut guard)?;
        }
        guard.leave_with(value)
    }

    /// Number of stored items
    pub fn len(&self) -> MonitorResult<usize> {
        self.monitor.do_within(|guard| Ok(guard.len()))
    }

    pub fn is_empty(&self) -> MonitorResult<bool> {
        self.monitor.do_within(|guard| Ok(guard.is_empty()))
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The underlying monitor, for listeners and statistics
    pub fn monitor(&self) -> &Monitor<Ring<T>> {
        &self.monitor
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("monitor", &self.monitor.name())
            .field("capacity", &self.capacity)
            .finish()
    }
}
