//! Transaction Management
//!
//! Opens the single transaction a migration run executes in and applies the
//! configured isolation level for the connected dialect.

use std::str::FromStr;

use customs_core::{ConfigError, CustomsConfig};
use sqlx::{Any, AnyPool, Transaction};
use tracing::debug;

use crate::database::Dialect;
use crate::error::{MigrationError, MigrationResult};

/// Transaction isolation levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Read Uncommitted - lowest isolation level
    ReadUncommitted,
    /// Read Committed - default PostgreSQL isolation level
    ReadCommitted,
    /// Repeatable Read - stronger consistency guarantees
    RepeatableRead,
    /// Serializable - highest isolation level
    Serializable,
}

impl IsolationLevel {
    /// Convert to SQL string for SET TRANSACTION ISOLATION LEVEL command
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// Check if this isolation level is supported by the given dialect
    pub fn is_supported_by(&self, dialect: Dialect) -> bool {
        match dialect {
            Dialect::PostgreSQL => true,
            // SQLite transactions are always serializable
            Dialect::SQLite => matches!(self, IsolationLevel::Serializable),
        }
    }

    /// Statement that selects this level inside an open transaction, if any is needed
    fn statement_for(&self, dialect: Dialect) -> Option<String> {
        match dialect {
            Dialect::PostgreSQL => Some(format!("SET TRANSACTION ISOLATION LEVEL {}", self.as_sql())),
            Dialect::SQLite => None,
        }
    }
}

impl FromStr for IsolationLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "read uncommitted" => Ok(IsolationLevel::ReadUncommitted),
            "read committed" => Ok(IsolationLevel::ReadCommitted),
            "repeatable read" => Ok(IsolationLevel::RepeatableRead),
            "serializable" => Ok(IsolationLevel::Serializable),
            _ => Err(ConfigError::invalid_value(
                "isolation_level",
                s,
                "read_uncommitted, read_committed, repeatable_read, or serializable",
            )),
        }
    }
}

/// Transaction configuration options
#[derive(Debug, Clone, Default)]
pub struct TransactionConfig {
    /// Transaction isolation level; the database default when unset
    pub isolation_level: Option<IsolationLevel>,
}

impl TransactionConfig {
    pub fn from_config(config: &CustomsConfig) -> Result<Self, ConfigError> {
        let isolation_level = config
            .isolation_level
            .as_deref()
            .map(IsolationLevel::from_str)
            .transpose()?;
        Ok(Self { isolation_level })
    }

    pub fn isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }
}

/// Begin a transaction on the pool with the given configuration
pub async fn begin(pool: &AnyPool, config: &TransactionConfig) -> MigrationResult<Transaction<'static, Any>> {
    debug!("Beginning transaction with config: {:?}", config);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| MigrationError::Transaction(format!("Failed to begin transaction: {}", e)))?;

    if let Some(level) = config.isolation_level {
        let dialect = Dialect::from_backend_name(tx.backend_name())?;
        if !level.is_supported_by(dialect) {
            return Err(MigrationError::Transaction(format!(
                "Isolation level {} is not supported by {}",
                level.as_sql(),
                dialect.name()
            )));
        }

        if let Some(sql) = level.statement_for(dialect) {
            sqlx::query(&sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| MigrationError::Transaction(format!("Failed to set isolation level: {}", e)))?;
        }
        debug!("Transaction isolation level set to: {:?}", level);
    }

    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_level_sql() {
        assert_eq!(IsolationLevel::ReadUncommitted.as_sql(), "READ UNCOMMITTED");
        assert_eq!(IsolationLevel::ReadCommitted.as_sql(), "READ COMMITTED");
        assert_eq!(IsolationLevel::RepeatableRead.as_sql(), "REPEATABLE READ");
        assert_eq!(IsolationLevel::Serializable.as_sql(), "SERIALIZABLE");
    }

    #[test]
    fn test_isolation_level_parsing() {
        assert_eq!("serializable".parse::<IsolationLevel>().unwrap(), IsolationLevel::Serializable);
        assert_eq!("READ_COMMITTED".parse::<IsolationLevel>().unwrap(), IsolationLevel::ReadCommitted);
        assert_eq!("repeatable-read".parse::<IsolationLevel>().unwrap(), IsolationLevel::RepeatableRead);
        assert!("snapshot".parse::<IsolationLevel>().is_err());
    }

    #[test]
    fn test_dialect_support() {
        assert!(IsolationLevel::ReadCommitted.is_supported_by(Dialect::PostgreSQL));
        assert!(IsolationLevel::Serializable.is_supported_by(Dialect::SQLite));
        assert!(!IsolationLevel::ReadCommitted.is_supported_by(Dialect::SQLite));
    }

    #[test]
    fn test_transaction_config_from_config() {
        let config = CustomsConfig::new("sqlite::memory:");
        assert!(TransactionConfig::from_config(&config).unwrap().isolation_level.is_none());

        let config = config.with_isolation_level("repeatable_read");
        assert_eq!(
            TransactionConfig::from_config(&config).unwrap().isolation_level,
            Some(IsolationLevel::RepeatableRead)
        );

        let config = CustomsConfig::new("sqlite::memory:").with_isolation_level("chaos");
        assert!(TransactionConfig::from_config(&config).is_err());
    }
}
