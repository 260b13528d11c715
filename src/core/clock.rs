//! Injectable time source.
//!
//! TTL evaluation and deployment timestamps go through a [`Clock`] trait so
//! expiry behavior is deterministic under test. Exactly one clock is active
//! per session context; no core code samples wall-clock time directly.

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// A source of the current time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source (default).
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced time source for tests.
///
/// Starts at a fixed instant and only moves when told to, so tests can step
/// across TTL boundaries without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Create a clock frozen at the Unix epoch.
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
