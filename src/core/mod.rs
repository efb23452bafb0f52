/*!
 * Core Module
 * Monitor engine, guards and error handling
 */

pub mod errors;
pub mod guard;
pub mod limits;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{Guard, GuardMetadata, MonitorGuard};
pub use sync::{
    Assertion, Condition, Invariant, InvariantChecks, Monitor, MonitorConfig, MonitorId,
    WaitStatus, WakeResult,
};
