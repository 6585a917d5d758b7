//! Database connectivity
//!
//! Migrations talk to the store through sqlx's `Any` driver so the same
//! migration code runs against PostgreSQL in production and SQLite in tests.

use std::time::Duration;

use customs_core::CustomsConfig;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::error::{MigrationError, MigrationResult};

/// SQL dialects the runner can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    PostgreSQL,
    SQLite,
}

impl Dialect {
    /// Detect the dialect from a connection URL
    pub fn from_url(database_url: &str) -> MigrationResult<Self> {
        match database_url.split(':').next().unwrap_or_default() {
            "postgres" | "postgresql" => Ok(Dialect::PostgreSQL),
            "sqlite" => Ok(Dialect::SQLite),
            other => Err(MigrationError::Connection(format!(
                "Unsupported database scheme '{}'",
                other
            ))),
        }
    }

    /// Detect the dialect from the `Any` driver's backend name
    pub fn from_backend_name(name: &str) -> MigrationResult<Self> {
        match name {
            "PostgreSQL" => Ok(Dialect::PostgreSQL),
            "SQLite" => Ok(Dialect::SQLite),
            other => Err(MigrationError::Connection(format!(
                "Unsupported database backend '{}'",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::SQLite => "SQLite",
        }
    }
}

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Seconds to wait for a connection
    pub acquire_timeout: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 1,
            acquire_timeout: 30,
        }
    }
}

impl PoolConfig {
    pub fn from_config(config: &CustomsConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            ..Default::default()
        }
    }
}

/// Create a connection pool for the given URL
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> MigrationResult<AnyPool> {
    sqlx::any::install_default_drivers();

    let dialect = Dialect::from_url(database_url)?;
    let mut options = AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout));

    // An in-memory SQLite database lives and dies with its connection
    if dialect == Dialect::SQLite {
        options = options.idle_timeout(None).max_lifetime(None);
    }

    let pool = options.connect(database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to {} database: {}", dialect.name(), e);
        MigrationError::Connection(format!("Failed to connect to database: {}", e))
    })?;

    tracing::debug!(
        dialect = dialect.name(),
        max_connections = config.max_connections,
        "database pool created"
    );
    Ok(pool)
}
