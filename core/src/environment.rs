//! Injected environment dependencies.
//!
//! Anything with a side effect the rules depend on (currently: "what time is
//! it") sits behind a trait so tests can pin it.

use chrono::{DateTime, Utc};

/// Abstracts time for testability.
///
/// # Examples
///
/// ```
/// use linkboard_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let earlier = clock.now();
/// assert!(clock.now() >= earlier);
/// ```
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
