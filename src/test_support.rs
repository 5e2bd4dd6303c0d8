//! Shared fixtures for unit and integration suites.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::outbound::persistence::{DbPool, PoolConfig};

/// Clock whose instant is set by the test and advanced manually.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(TimeDelta::days(days));
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fresh in-memory database with migrations applied.
///
/// SQLite gives every connection its own `:memory:` database, so the pool is
/// capped at one connection to keep all operations on the same store.
pub fn in_memory_pool() -> DbPool {
    let config = PoolConfig::new(":memory:").with_max_size(1);
    match DbPool::new(config) {
        Ok(pool) => pool,
        Err(err) => panic!("failed to build in-memory pool: {err}"),
    }
}
