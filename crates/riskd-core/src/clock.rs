//! Injectable wall-clock source (§5 "Injectable clock").
//!
//! Every component that reads wall time — day-boundary checks, session-hours
//! checks, timer scheduling, dedup TTL expiry — goes through this trait
//! instead of calling `Utc::now()` directly, so tests can drive time forward
//! deterministically instead of sleeping real seconds.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock: the real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// A clock whose reading is set explicitly by the test, never the OS.
    pub struct FakeClock {
        micros_since_epoch: AtomicI64,
    }

    impl FakeClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                micros_since_epoch: AtomicI64::new(start.timestamp_micros()),
            }
        }

        pub fn advance(&self, duration: chrono::Duration) {
            self.micros_since_epoch
                .fetch_add(duration.num_microseconds().unwrap_or(0), Ordering::SeqCst);
        }

        pub fn set(&self, at: DateTime<Utc>) {
            self.micros_since_epoch.store(at.timestamp_micros(), Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_micros(self.micros_since_epoch.load(Ordering::SeqCst))
                .expect("fake clock holds a valid timestamp")
        }
    }
}
