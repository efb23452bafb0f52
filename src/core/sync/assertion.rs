/*!
 * Assertions
 *
 * Named predicates over monitor-protected state. Used both as monitor
 * invariants and as condition guards.
 */

use crate::core::errors::{MonitorError, MonitorResult};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

enum Predicate<T> {
    Always,
    Function(fn(&T) -> bool),
    Closure(Arc<dyn Fn(&T) -> bool + Send + Sync>),
}

/// A named, side-effect free predicate evaluated on demand
///
/// The predicate receives the protected state and may also capture
/// externally mutable state (atomics, shared counters), so two evaluations
/// at different times can legitimately disagree.
///
/// # Example
///
/// ```
/// use monitor_object::core::sync::Assertion;
///
/// let non_negative = Assertion::new("value >= 0", |v: &i64| *v >= 0);
/// assert!(non_negative.is_true(&3));
/// assert!(!non_negative.is_true(&-1));
/// ```
pub struct Assertion<T> {
    name: Cow<'static, str>,
    predicate: Predicate<T>,
}

impl<T> Assertion<T> {
    /// Create an assertion from a closure
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Predicate::Closure(Arc::new(predicate)),
        }
    }

    /// Create an assertion from a plain function
    ///
    /// Unlike `new`, this places no `'static` bound on `T`.
    pub fn from_fn(name: impl Into<Cow<'static, str>>, predicate: fn(&T) -> bool) -> Self {
        Self {
            name: name.into(),
            predicate: Predicate::Function(predicate),
        }
    }

    /// The assertion that always holds
    pub fn always() -> Self {
        Self {
            name: Cow::Borrowed("true"),
            predicate: Predicate::Always,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate
    #[inline]
    pub fn is_true(&self, state: &T) -> bool {
        match &self.predicate {
            Predicate::Always => true,
            Predicate::Function(f) => f(state),
            Predicate::Closure(f) => f(state),
        }
    }

    /// Evaluate the predicate, failing with `AssertionFailed` if false
    pub fn check(&self, monitor: &str, state: &T) -> MonitorResult<()> {
        if self.is_true(state) {
            Ok(())
        } else {
            Err(MonitorError::AssertionFailed {
                monitor: monitor.to_string(),
                assertion: self.name.to_string(),
            })
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Always => Predicate::Always,
            Predicate::Function(f) => Predicate::Function(*f),
            Predicate::Closure(f) => Predicate::Closure(Arc::clone(f)),
        }
    }
}

impl<T> Clone for Assertion<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for Assertion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion").field("name", &self.name).finish()
    }
}

/// Capability interface for state types that carry their own invariant
///
/// `Monitor::guarded` builds the monitor invariant from this impl.
pub trait Invariant {
    /// Name reported in diagnostics
    fn invariant_name(&self) -> &'static str {
        "invariant"
    }

    /// Whether the invariant holds for this state
    fn holds(&self) -> bool;

    /// Short description of the state for diagnostics
    fn summary(&self) -> String {
        String::from("<opaque>")
    }
}

impl<T: Invariant> From<&T> for Assertion<T> {
    fn from(state: &T) -> Self {
        Assertion::from_fn(state.invariant_name(), T::holds)
    }
}
