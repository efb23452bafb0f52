/*!
 * Monitor Statistics
 * Lock-free counters for monitor activity with a serializable snapshot
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters, updated with relaxed atomics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with the monitor lock
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct MonitorStats {
    entries: AtomicU64,
    waits: AtomicU64,
    signals: AtomicU64,
    woken: AtomicU64,
    timeouts: AtomicU64,
    violations: AtomicU64,
    hold_micros: AtomicU64,
}

impl MonitorStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_enter(&self) {
        self.entries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_signal(&self, woken: usize) {
        self.signals.fetch_add(1, Ordering::Relaxed);
        self.woken.fetch_add(woken as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_violation(&self) {
        self.violations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_hold(&self, held: Duration) {
        self.hold_micros
            .fetch_add(held.as_micros() as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> MonitorStatsSnapshot {
        MonitorStatsSnapshot {
            entries: self.entries.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            signals: self.signals.load(Ordering::Relaxed),
            woken: self.woken.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            violations: self.violations.load(Ordering::Relaxed),
            hold_micros: self.hold_micros.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of monitor counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatsSnapshot {
    /// Successful `enter` calls
    pub entries: u64,
    /// Condition waits started
    pub waits: u64,
    /// Signal operations that found waiters
    pub signals: u64,
    /// Threads woken by those signals
    pub woken: u64,
    /// Bounded waits that gave up
    pub timeouts: u64,
    /// Failed invariant or assertion checks
    pub violations: u64,
    /// Total time the lock was occupied, excluding parked waits
    pub hold_micros: u64,
}

impl MonitorStatsSnapshot {
    /// Mean occupancy per entry in microseconds
    pub fn mean_hold_micros(&self) -> f64 {
        if self.entries == 0 {
            return 0.0;
        }
        self.hold_micros as f64 / self.entries as f64
    }
}
