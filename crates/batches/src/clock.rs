//! Time source for store-assigned timestamps.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
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

/// A clock that only moves when told to. Used to make timestamps
/// deterministic in tests.
#[derive(Debug)]
pub struct TestClock {
    time: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            time: Mutex::new(start),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        let mut guard = self.time.lock().unwrap_or_else(|p| p.into_inner());
        *guard = time;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.time.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.time.lock().unwrap_or_else(|p| p.into_inner())
    }
}
