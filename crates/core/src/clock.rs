//! Wall-clock source for request timestamps.

use chrono::{DateTime, Utc};

use crate::config::TimeUnit;

/// Supplies the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current Unix time rendered in `unit`, as sent in the `time` field.
    fn timestamp(&self, unit: TimeUnit) -> String {
        let now = self.now();
        match unit {
            TimeUnit::Seconds => now.timestamp().to_string(),
            TimeUnit::Milliseconds => now.timestamp_millis().to_string(),
        }
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Clock frozen at the given Unix time in milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
