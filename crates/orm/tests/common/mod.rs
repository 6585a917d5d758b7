#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use customs_orm::{async_trait, create_pool, MigrationError, PoolConfig, Reporter, Throttle};
use sqlx::AnyPool;

/// In-memory SQLite pool with a seeded `test_users` table
pub async fn seeded_pool(names: &[&str]) -> AnyPool {
    let pool = create_pool("sqlite::memory:", &PoolConfig::default())
        .await
        .expect("in-memory pool");

    sqlx::query("CREATE TABLE test_users (id INTEGER PRIMARY KEY, name TEXT, active INTEGER NOT NULL DEFAULT 1)")
        .execute(&pool)
        .await
        .expect("create table");

    for name in names {
        sqlx::query(&format!("INSERT INTO test_users (name) VALUES ('{}')", name))
            .execute(&pool)
            .await
            .expect("seed row");
    }
    pool
}

pub async fn count_users(pool: &AnyPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_users")
        .fetch_one(pool)
        .await
        .expect("count")
}

pub async fn user_names(pool: &AnyPool) -> Vec<String> {
    sqlx::query_scalar("SELECT name FROM test_users ORDER BY id")
        .fetch_all(pool)
        .await
        .expect("names")
}

/// Records status output instead of printing it
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn success(&self) {
        self.events.lock().unwrap().push("success".to_string());
    }

    fn failure(&self, error: &MigrationError) {
        self.events.lock().unwrap().push(format!("failure: {}", error));
    }
}

/// Records requested pauses without sleeping
#[derive(Default)]
pub struct RecordingThrottle {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingThrottle {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Throttle for RecordingThrottle {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

pub fn recorders() -> (Arc<RecordingReporter>, Arc<RecordingThrottle>) {
    (Arc::new(RecordingReporter::default()), Arc::new(RecordingThrottle::default()))
}
