/*!
 * RAII Monitor Guards
 *
 * Scoped occupancy of a monitor with automatic, checked release.
 *
 * ## Design Principles
 *
 * 1. **Proof of ownership**: holding a `MonitorGuard` is the only way to
 *    touch protected state or to wait on and signal its conditions
 * 2. **Guaranteed release**: dropping the guard leaves the monitor, also
 *    during unwinding
 * 3. **Checked release**: `leave` reports a broken invariant as an error;
 *    drop logs it instead of panicking
 *
 * ## Example
 *
 * ```rust
 * use monitor_object::core::sync::Monitor;
 *
 * let monitor = Monitor::new(Vec::<u32>::new());
 * let mut guard = monitor.enter().unwrap();
 * guard.push(1);
 * guard.leave().unwrap();
 * ```
 */

mod monitor;
mod traits;

pub use monitor::MonitorGuard;
pub use traits::Guard;

use std::sync::Arc;
use std::time::Instant;

/// Start time and owning monitor of a hold
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub creation_time: Instant,
    pub owner: Option<Arc<str>>,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str) -> Self {
        Self {
            resource_type,
            creation_time: Instant::now(),
            owner: None,
        }
    }

    #[inline]
    pub fn with_owner(mut self, owner: Arc<str>) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Restart the lifetime clock
    #[inline]
    pub fn restart(&mut self) {
        self.creation_time = Instant::now();
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.creation_time.elapsed().as_micros() as u64
    }
}
