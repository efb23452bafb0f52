/*!
 * Monitor
 *
 * A mutual-exclusion region around protected state, with an invariant that
 * is checked at every boundary (enter, leave, wait) and a factory for the
 * conditions bound to it.
 *
 * # Design
 *
 * The protected state and the wait-sets of all conditions live together
 * behind one `parking_lot::Mutex`. A condition is an index into that vector
 * plus the id of the monitor that created it, so registering a waiter and
 * releasing the lock happen in the same critical section and no signal can
 * slip in between. Conditions follow Mesa semantics: a woken thread competes
 * for the lock again and must re-check its predicate.
 */

use super::assertion::{Assertion, Invariant};
use super::config::{InvariantChecks, MonitorConfig};
use super::condition::Condition;
use super::waiter::WaitSet;
use crate::core::errors::{MonitorError, MonitorResult, Phase};
use crate::core::guard::MonitorGuard;
use crate::core::limits::LISTENER_INITIAL_CAPACITY;
use crate::monitoring::{
    MonitorEvent, MonitorListener, MonitorStats, MonitorStatsSnapshot, TracingListener,
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Process-unique monitor identifier
pub type MonitorId = u64;

static NEXT_MONITOR_ID: AtomicU64 = AtomicU64::new(1);

/// Everything guarded by the monitor lock
pub(crate) struct Inner<T> {
    pub(crate) data: T,
    pub(crate) wait_sets: Vec<WaitSet>,
}

/// Mutual-exclusion region with an invariant and condition queues
///
/// # Example
///
/// ```
/// use monitor_object::core::sync::{Assertion, Monitor, MonitorConfig};
///
/// let counter = Monitor::with_invariant(
///     MonitorConfig::named("counter"),
///     0u32,
///     Assertion::new("counter <= 10", |c: &u32| *c <= 10),
/// );
///
/// let value = counter
///     .do_within(|guard| {
///         **guard += 1;
///         Ok(**guard)
///     })
///     .unwrap();
/// assert_eq!(value, 1);
/// ```
pub struct Monitor<T> {
    id: MonitorId,
    name: Arc<str>,
    inner: Mutex<Inner<T>>,
    invariant: Assertion<T>,
    summarize: fn(&T) -> String,
    checks: InvariantChecks,
    occupied: AtomicBool,
    listeners: RwLock<Vec<Arc<dyn MonitorListener>>>,
    stats: MonitorStats,
}

fn opaque<T>(_: &T) -> String {
    String::from("<opaque>")
}

fn summarize_invariant<T: Invariant>(state: &T) -> String {
    state.summary()
}

impl<T> Monitor<T> {
    /// Monitor with default configuration and a trivially true invariant
    pub fn new(data: T) -> Self {
        Self::build(MonitorConfig::default(), data, Assertion::always(), opaque::<T>)
    }

    /// Monitor with an explicit invariant
    pub fn with_invariant(config: MonitorConfig, data: T, invariant: Assertion<T>) -> Self {
        Self::build(config, data, invariant, opaque::<T>)
    }

    /// Monitor whose invariant is the state's own `Invariant` impl
    pub fn guarded(config: MonitorConfig, data: T) -> Self
    where
        T: Invariant,
    {
        let invariant = Assertion::from(&data);
        Self::build(config, data, invariant, summarize_invariant::<T>)
    }

    fn build(
        config: MonitorConfig,
        data: T,
        invariant: Assertion<T>,
        summarize: fn(&T) -> String,
    ) -> Self {
        let mut listeners: Vec<Arc<dyn MonitorListener>> =
            Vec::with_capacity(LISTENER_INITIAL_CAPACITY);
        if config.trace_events {
            listeners.push(Arc::new(TracingListener));
        }

        Self {
            id: NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(config.name.as_str()),
            inner: Mutex::new(Inner {
                data,
                wait_sets: Vec::new(),
            }),
            invariant,
            summarize,
            checks: config.invariant_checks,
            occupied: AtomicBool::new(false),
            listeners: RwLock::new(listeners),
            stats: MonitorStats::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> MonitorId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    /// The monitor invariant
    pub fn invariant(&self) -> &Assertion<T> {
        &self.invariant
    }

    /// Whether some thread currently occupies the monitor
    ///
    /// Threads parked in a condition wait do not count as occupants.
    pub fn is_occupied(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> MonitorStatsSnapshot {
        self.stats.snapshot()
    }

    /// Register a listener for all subsequent transitions
    ///
    /// Listeners run while the monitor lock is held and must not call back
    /// into this monitor.
    pub fn add_listener(&self, listener: Arc<dyn MonitorListener>) {
        self.listeners.write().push(listener);
    }

    /// Create a condition with no guard assertion
    ///
    /// Must not be called while the calling thread is inside this monitor.
    pub fn make_condition(&self, name: impl Into<String>) -> Condition<T> {
        self.register_condition(name.into(), None)
    }

    /// Create a condition whose assertion must hold whenever it is signaled
    ///
    /// Must not be called while the calling thread is inside this monitor.
    pub fn make_condition_with(
        &self,
        name: impl Into<String>,
        assertion: Assertion<T>,
    ) -> Condition<T> {
        self.register_condition(name.into(), Some(assertion))
    }

    fn register_condition(&self, name: String, assertion: Option<Assertion<T>>) -> Condition<T> {
        let mut inner = self.inner.lock();
        let index = inner.wait_sets.len();
        inner.wait_sets.push(WaitSet::new());
        Condition::new(self.id, index, Arc::from(name.as_str()), assertion)
    }

    /// Enter the monitor
    ///
    /// Blocks until the monitor is unoccupied. The returned guard gives access
    /// to the protected state; the monitor is left when the guard is consumed
    /// by `leave` or dropped. A thread must not enter a monitor it already
    /// occupies.
    pub fn enter(&self) -> MonitorResult<MonitorGuard<'_, T>> {
        self.emit(|| MonitorEvent::CallEnter {
            monitor: self.name.clone(),
        });

        let inner = self.inner.lock();
        self.occupy()?;
        self.stats.record_enter();
        self.emit(|| MonitorEvent::ReturnFromEnter {
            monitor: self.name.clone(),
        });

        let guard = MonitorGuard::new(self, inner);
        if let Err(err) = self.check_invariant(&guard, Phase::Enter) {
            guard.abandon();
            return Err(err);
        }
        Ok(guard)
    }

    /// Run `body` inside the monitor
    ///
    /// The monitor is left afterwards even when `body` fails or panics.
    pub fn do_within<R, F>(&self, body: F) -> MonitorResult<R>
    where
        F: FnOnce(&mut MonitorGuard<'_, T>) -> MonitorResult<R>,
    {
        let mut guard = self.enter()?;
        let result = body(&mut guard)?;
        guard.leave_with(result)
    }

    /// Run `body` inside the monitor, handing it the guard by value
    ///
    /// The body may leave on its own (for example through
    /// [`Condition::signal_and_leave`]) and return `None`, or hand the guard
    /// back so the monitor is left here. A guard dropped inside `body` leaves
    /// as well.
    pub fn do_within_owned<'a, R, F>(&'a self, body: F) -> MonitorResult<R>
    where
        F: FnOnce(MonitorGuard<'a, T>) -> MonitorResult<(R, Option<MonitorGuard<'a, T>>)>,
    {
        let guard = self.enter()?;
        match body(guard)? {
            (result, Some(guard)) => guard.leave_with(result),
            (result, None) => Ok(result),
        }
    }

    /// Consume the monitor, returning the protected state
    pub fn into_inner(self) -> T {
        self.inner.into_inner().data
    }

    fn occupy(&self) -> MonitorResult<()> {
        if self.occupied.swap(true, Ordering::AcqRel) {
            return Err(MonitorError::IllegalMonitorState {
                monitor: self.name.to_string(),
                reason: "two threads in one monitor".to_string(),
            });
        }
        Ok(())
    }

    /// Verify the invariant against the current state
    pub(crate) fn check_invariant(&self, state: &T, phase: Phase) -> MonitorResult<()> {
        if !self.checks.enabled() || self.invariant.is_true(state) {
            return Ok(());
        }

        let summary = (self.summarize)(state);
        self.stats.record_violation();
        error!(
            monitor = %self.name,
            invariant = self.invariant.name(),
            phase = %phase,
            state = %summary,
            "monitor invariant violated"
        );
        self.emit(|| MonitorEvent::Violation {
            monitor: self.name.clone(),
            phase,
        });

        Err(MonitorError::InvariantViolation {
            monitor: self.name.to_string(),
            invariant: self.invariant.name().to_string(),
            phase,
            state: summary,
        })
    }

    /// Verify a condition assertion before its waiters are signaled
    pub(crate) fn check_assertion(
        &self,
        condition: &str,
        assertion: &Assertion<T>,
        state: &T,
    ) -> MonitorResult<()> {
        if !self.checks.enabled() || assertion.is_true(state) {
            return Ok(());
        }

        self.stats.record_violation();
        error!(
            monitor = %self.name,
            condition,
            assertion = assertion.name(),
            "condition signaled while its assertion is false"
        );
        self.emit(|| MonitorEvent::Violation {
            monitor: self.name.clone(),
            phase: Phase::Signal,
        });

        Err(MonitorError::AssertionFailed {
            monitor: self.name.to_string(),
            assertion: format!("{}: {}", condition, assertion.name()),
        })
    }

    pub(crate) fn illegal_state(&self, reason: String) -> MonitorError {
        MonitorError::IllegalMonitorState {
            monitor: self.name.to_string(),
            reason,
        }
    }

    /// Bookkeeping when the occupant leaves (explicitly or by drop)
    pub(crate) fn exit(&self, state: &T, held: Duration, checked: bool) -> MonitorResult<()> {
        let result = if checked {
            self.check_invariant(state, Phase::Leave)
        } else {
            Ok(())
        };

        self.stats.record_hold(held);
        self.occupied.store(false, Ordering::Release);
        self.emit(|| MonitorEvent::Leave {
            monitor: self.name.clone(),
        });
        result
    }

    /// Bookkeeping right before the occupant parks on a condition
    pub(crate) fn suspend(&self, condition: &Arc<str>, held: Duration) {
        self.stats.record_wait();
        self.stats.record_hold(held);
        self.emit(|| MonitorEvent::CallWait {
            monitor: self.name.clone(),
            condition: condition.clone(),
        });
        self.occupied.store(false, Ordering::Release);
    }

    /// Bookkeeping once a parked thread holds the lock again
    pub(crate) fn resume(&self, condition: &Arc<str>, timed_out: bool) -> MonitorResult<()> {
        self.occupy()?;
        if timed_out {
            self.stats.record_timeout();
        }
        self.emit(|| MonitorEvent::ReturnFromWait {
            monitor: self.name.clone(),
            condition: condition.clone(),
            timed_out,
        });
        Ok(())
    }

    pub(crate) fn signaled(&self, condition: &Arc<str>, woken: usize) {
        self.stats.record_signal(woken);
        self.emit(|| MonitorEvent::SignallerAwakesWaiter {
            monitor: self.name.clone(),
            condition: condition.clone(),
            woken,
        });
    }

    pub(crate) fn signaller_leaves(&self, condition: &Arc<str>) {
        self.emit(|| MonitorEvent::SignallerLeaves {
            monitor: self.name.clone(),
            condition: condition.clone(),
        });
    }

    #[inline]
    fn emit<F>(&self, make: F)
    where
        F: FnOnce() -> MonitorEvent,
    {
        let listeners = self.listeners.read();
        if listeners.is_empty() {
            return;
        }
        let event = make();
        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }
}

impl<T> fmt::Debug for Monitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("invariant", &self.invariant.name())
            .field("occupied", &self.is_occupied())
            .finish()
    }
}
