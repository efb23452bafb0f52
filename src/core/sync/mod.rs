/*!
 * Monitor Synchronization
 *
 * Monitors with explicit condition queues, built from a mutex and
 * per-waiter condvars:
 * - `Monitor`: mutual exclusion plus an invariant checked at every boundary
 * - `Condition`: FIFO wait-set bound to one monitor
 * - `Assertion` / `Invariant`: predicates over the protected state
 *
 * # Architecture
 *
 * Entering a monitor yields a `MonitorGuard`; conditions take that guard as
 * proof of lock ownership, so waiting or signaling outside the monitor does
 * not type-check and using another monitor's guard fails fast.
 *
 * # Use Cases
 *
 * - **Bounded buffers**: producers wait for room, consumers for items
 * - **Barriers**: N parties rendezvous and share a computed result
 */

mod assertion;
mod condition;
mod config;
mod monitor;
mod traits;
mod waiter;

pub use assertion::{Assertion, Invariant};
pub use condition::Condition;
pub use config::{InvariantChecks, MonitorConfig};
pub use monitor::{Monitor, MonitorId};
pub use traits::{WaitStatus, WakeResult};

pub(crate) use monitor::Inner;
pub(crate) use waiter::WaitSet;
