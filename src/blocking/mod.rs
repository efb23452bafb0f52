/*!
 * Blocking Structures
 *
 * Data structures built on monitors:
 * - `BoundedQueue`: fixed-capacity FIFO, producers and consumers block
 * - `VoteMonitor`: N-of-N rendezvous returning a shared majority result
 */

mod queue;
mod vote;

pub use queue::{BoundedQueue, Ring};
pub use vote::{Ballot, VoteMonitor};
