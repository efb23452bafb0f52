/*!
 * Error Types
 * Monitor errors with thiserror, miette and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Boundary at which a monitor check ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// After acquiring the lock in `enter`
    Enter,
    /// Before releasing the lock in `leave` (or on guard drop)
    Leave,
    /// Before parking in, or after returning from, a condition wait
    Wait,
    /// While signaling a condition
    Signal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Enter => "enter",
            Phase::Leave => "leave",
            Phase::Wait => "wait",
            Phase::Signal => "signal",
        };
        f.write_str(name)
    }
}

/// Monitor errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MonitorError {
    #[error("Invariant `{invariant}` of monitor `{monitor}` violated on {phase} (state: {state})")]
    #[diagnostic(
        code(monitor::invariant_violation),
        help("A previous critical section exited without restoring the invariant. The protected state is corrupt.")
    )]
    InvariantViolation {
        monitor: String,
        invariant: String,
        phase: Phase,
        state: String,
    },

    #[error("Illegal monitor state in `{monitor}`: {reason}")]
    #[diagnostic(
        code(monitor::illegal_state),
        help("Conditions may only be used while holding the lock of the monitor that created them.")
    )]
    IllegalMonitorState { monitor: String, reason: String },

    #[error("Assertion `{assertion}` of monitor `{monitor}` is false")]
    #[diagnostic(
        code(monitor::assertion_failed),
        help("Establish the condition's assertion before signaling its waiters.")
    )]
    AssertionFailed { monitor: String, assertion: String },

    #[error("Invalid queue capacity: {0}")]
    #[diagnostic(
        code(monitor::invalid_capacity),
        help("A bounded queue needs room for at least one item.")
    )]
    InvalidCapacity(usize),

    #[error("Invalid number of voters: {0}")]
    #[diagnostic(
        code(monitor::invalid_voter_count),
        help("A vote needs at least one participant.")
    )]
    InvalidVoterCount(usize),
}

impl MonitorError {
    /// Whether the error reports corrupted protected state
    #[inline]
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            MonitorError::InvariantViolation { .. } | MonitorError::AssertionFailed { .. }
        )
    }
}
