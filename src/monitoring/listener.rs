/*!
 * Monitor Listeners
 *
 * Observer hooks for every monitor transition: entering, leaving, waiting,
 * and signaling. Listeners run on the thread performing the transition,
 * while it holds the monitor lock (except `CallEnter`), so they must be cheap
 * and must never touch the monitor they observe.
 */

use crate::core::errors::Phase;
use crate::core::limits::EVENT_LOG_CAPACITY;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

/// A single monitor transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A thread is about to block on the monitor lock
    CallEnter { monitor: Arc<str> },
    /// A thread now occupies the monitor
    ReturnFromEnter { monitor: Arc<str> },
    /// The occupant left the monitor
    Leave { monitor: Arc<str> },
    /// The occupant is about to park on a condition
    CallWait {
        monitor: Arc<str>,
        condition: Arc<str>,
    },
    /// A parked thread occupies the monitor again
    ReturnFromWait {
        monitor: Arc<str>,
        condition: Arc<str>,
        timed_out: bool,
    },
    /// The occupant woke waiters of a condition
    SignallerAwakesWaiter {
        monitor: Arc<str>,
        condition: Arc<str>,
        woken: usize,
    },
    /// The occupant signaled and left in one step
    SignallerLeaves {
        monitor: Arc<str>,
        condition: Arc<str>,
    },
    /// An invariant or assertion check failed
    Violation { monitor: Arc<str>, phase: Phase },
}

impl MonitorEvent {
    /// Name of the monitor the event belongs to
    pub fn monitor(&self) -> &str {
        match self {
            MonitorEvent::CallEnter { monitor }
            | MonitorEvent::ReturnFromEnter { monitor }
            | MonitorEvent::Leave { monitor }
            | MonitorEvent::CallWait { monitor, .. }
            | MonitorEvent::ReturnFromWait { monitor, .. }
            | MonitorEvent::SignallerAwakesWaiter { monitor, .. }
            | MonitorEvent::SignallerLeaves { monitor, .. }
            | MonitorEvent::Violation { monitor, .. } => &**monitor,
        }
    }

    /// Short snake_case kind, matching the serialized tag
    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::CallEnter { .. } => "call_enter",
            MonitorEvent::ReturnFromEnter { .. } => "return_from_enter",
            MonitorEvent::Leave { .. } => "leave",
            MonitorEvent::CallWait { .. } => "call_wait",
            MonitorEvent::ReturnFromWait { .. } => "return_from_wait",
            MonitorEvent::SignallerAwakesWaiter { .. } => "signaller_awakes_waiter",
            MonitorEvent::SignallerLeaves { .. } => "signaller_leaves",
            MonitorEvent::Violation { .. } => "violation",
        }
    }
}

/// Receives monitor transitions
pub trait MonitorListener: Send + Sync {
    fn on_event(&self, event: &MonitorEvent);
}

/// Forwards monitor transitions to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl MonitorListener for TracingListener {
    fn on_event(&self, event: &MonitorEvent) {
        match event {
            MonitorEvent::CallWait { monitor, condition } => {
                debug!(monitor = %monitor, condition = %condition, "waiting on condition");
            }
            MonitorEvent::ReturnFromWait {
                monitor,
                condition,
                timed_out,
            } => {
                debug!(monitor = %monitor, condition = %condition, timed_out, "returned from wait");
            }
            MonitorEvent::SignallerAwakesWaiter {
                monitor,
                condition,
                woken,
            } => {
                debug!(monitor = %monitor, condition = %condition, woken, "signaled condition");
            }
            other => {
                trace!(monitor = %other.monitor(), event = other.kind(), "monitor transition");
            }
        }
    }
}

/// Bounded in-memory record of monitor transitions
///
/// Keeps the most recent events; older ones are discarded once full.
pub struct EventLog {
    events: Mutex<VecDeque<MonitorEvent>>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity.min(EVENT_LOG_CAPACITY))),
            capacity: capacity.max(1),
        }
    }

    /// Copy of all retained events, oldest first
    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Retained event kinds, oldest first
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(MonitorEvent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Serialize the retained events as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let events = self.events.lock();
        serde_json::to_string(&*events)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorListener for EventLog {
    fn on_event(&self, event: &MonitorEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
