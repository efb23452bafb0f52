/*!
 * Monitor Object Library
 *
 * Monitors with invariants and explicit condition queues, plus blocking
 * structures built on them
 */

pub mod blocking;
pub mod core;
pub mod monitoring;

// Re-exports
pub use blocking::{BoundedQueue, VoteMonitor};
pub use self::core::errors::*;
pub use self::core::{
    Assertion, Condition, Invariant, InvariantChecks, Monitor, MonitorConfig, MonitorGuard,
    WaitStatus, WakeResult,
};
pub use monitoring::{init_tracing, EventLog, MonitorEvent, MonitorListener, TracingListener};
