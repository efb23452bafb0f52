/*!
 * Guard Traits
 *
 * What every scoped hold on a monitor reports about itself
 */

use super::GuardMetadata;

/// Scoped hold on a lock-protected resource
///
/// Diagnostics use these to say which monitor is occupied and since when.
pub trait Guard {
    /// Kind of resource held, e.g. `"monitor"`
    fn resource_type(&self) -> &'static str;

    /// When the hold began and which monitor it belongs to
    fn metadata(&self) -> &GuardMetadata;

    /// False once the hold has been given up
    fn is_active(&self) -> bool;
}
