/*!
 * Limits and Constants
 *
 * Centralized location for monitor-wide defaults and thresholds.
 */

use std::time::Duration;

// =============================================================================
// MONITOR DEFAULTS
// =============================================================================

/// Name given to monitors constructed without an explicit name
pub const DEFAULT_MONITOR_NAME: &str = "monitor";

/// Initial capacity of a condition wait-set
/// Most conditions see only a handful of concurrent waiters
pub const WAIT_SET_INITIAL_CAPACITY: usize = 4;

/// Initial capacity reserved for listener registrations
pub const LISTENER_INITIAL_CAPACITY: usize = 2;

// =============================================================================
// EVENT LOG
// =============================================================================

/// Default number of events retained by an `EventLog`
/// Oldest events are discarded once the log is full
pub const EVENT_LOG_CAPACITY: usize = 4096;

// =============================================================================
// BLOCKING STRUCTURES
// =============================================================================

/// Capacity used by the demo producer/consumer run
pub const DEMO_QUEUE_CAPACITY: usize = 4;

/// Voter count used by the demo election rounds
pub const DEMO_VOTERS: usize = 5;

/// Upper bound the demo waits on a single fetch before reporting a stall
pub const DEMO_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
