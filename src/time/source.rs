//! Time source abstraction for real and manually driven time.
//!
//! The controller never calls the system clock directly: every policy
//! evaluation asks its [`TimeSource`] for "now", and the ticker sleeps through
//! it. Production code uses [`RealTimeSource`]; tests drive a
//! [`ManualTimeSource`] across period boundaries and midnight without waiting.

use chrono::{DateTime, Utc};
use std::time::Duration as StdDuration;

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Get the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for the specified duration (or simulate it).
    fn sleep(&self, duration: StdDuration);
}

/// Real-time implementation that uses actual system time.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }
}

#[cfg(any(test, feature = "testing-support"))]
pub use manual::ManualTimeSource;

#[cfg(any(test, feature = "testing-support"))]
mod manual {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;

    /// Settable clock. `sleep` advances the stored instant instead of blocking.
    pub struct ManualTimeSource {
        current: Mutex<DateTime<Utc>>,
    }

    impl ManualTimeSource {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                current: Mutex::new(start),
            }
        }

        /// Jump to an absolute instant.
        pub fn set(&self, instant: DateTime<Utc>) {
            *self.current.lock().unwrap() = instant;
        }

        pub fn advance(&self, by: ChronoDuration) {
            let mut guard = self.current.lock().unwrap();
            *guard += by;
        }
    }

    impl TimeSource for ManualTimeSource {
        fn now(&self) -> DateTime<Utc> {
            *self.current.lock().unwrap()
        }

        fn sleep(&self, duration: StdDuration) {
            let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX);
            self.advance(step);
            // Let other threads observe the new instant
            std::thread::yield_now();
        }
    }
}
