/*!
 * Monitor Configuration
 *
 * Construction-time configuration for monitors
 */

use crate::core::limits::DEFAULT_MONITOR_NAME;
use serde::{Deserialize, Serialize};

/// When the monitor evaluates its invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantChecks {
    /// Check on every enter, leave and wait (default)
    Always,
    /// Check only in debug builds
    DebugOnly,
    /// Never check (the invariant is documentation only)
    Never,
}

impl InvariantChecks {
    /// Whether checks are active for the current build
    #[inline]
    pub fn enabled(&self) -> bool {
        match self {
            InvariantChecks::Always => true,
            InvariantChecks::DebugOnly => cfg!(debug_assertions),
            InvariantChecks::Never => false,
        }
    }
}

/// Monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name used in diagnostics and trace events
    pub name: String,
    /// Invariant checking policy
    pub invariant_checks: InvariantChecks,
    /// Attach a `TracingListener` at construction
    pub trace_events: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MONITOR_NAME.to_string(),
            invariant_checks: InvariantChecks::Always,
            trace_events: false,
        }
    }
}

impl MonitorConfig {
    /// Default configuration with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Configuration with invariant checking disabled
    pub fn unchecked(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            invariant_checks: InvariantChecks::Never,
            trace_events: false,
        }
    }

    /// Emit every monitor transition through `tracing`
    pub fn traced(mut self) -> Self {
        self.trace_events = true;
        self
    }
}
