//! Clock providers for sampling "now" in the call centre's operating timezone.
//!
//! Evaluators never read a clock themselves. Callers sample one moment per
//! logical decision and pass it down, so a slot cannot flip between the time a
//! form is rendered and the time the same request validates it.

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Source of the current local moment.
pub trait Clock: Send + Sync {
    /// The current wall-clock moment in the operating timezone.
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time converted into a fixed IANA timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }
}

/// A clock frozen at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
