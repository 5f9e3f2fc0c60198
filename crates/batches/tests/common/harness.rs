//! Test harness for isolated store execution.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use batches::{BatchSpec, Clock, Database, Repo, Store, TestClock};

/// An in-memory store plus the clock that stamps its rows.
pub struct TestHarness {
    pub store: Store,
    pub clock: Arc<TestClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        let clock = Arc::new(TestClock::new(start_time()));
        let db = Database::open_in_memory().expect("Failed to create test database");
        Self {
            store: Store::with_clock(db, clock.clone()),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn repo(&self, name: &str) -> Repo {
        self.store
            .create_repo(name, "GITHUB")
            .expect("Failed to create repo")
    }

    pub fn deleted_repo(&self, name: &str) -> Repo {
        let repo = self.repo(name);
        self.store
            .delete_repo(repo.id)
            .expect("Failed to delete repo");
        self.store.get_repo(repo.id).expect("Failed to reload repo")
    }

    pub fn batch_spec(&self, allow_ignored: bool, allow_unsupported: bool) -> BatchSpec {
        self.store
            .create_batch_spec(&BatchSpec {
                namespace_user_id: Some(1),
                user_id: 1,
                allow_ignored,
                allow_unsupported,
                ..Default::default()
            })
            .expect("Failed to create batch spec")
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
}
