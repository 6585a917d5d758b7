//! Error types for data migrations
//!
//! Errors raised by a migration's `up` or `verify` travel through the runner
//! untouched; the runner only rolls back and reports before returning them.

use customs_core::ConfigError;
use thiserror::Error;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for data migration operations
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Application error raised by a migration author
    #[error("{0}")]
    Failed(String),

    /// The migration ran but did not produce the expected state
    #[error("{0}")]
    Verification(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Connection pool could not be created
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transaction could not be started, configured or committed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Migration name did not resolve to a registered migration
    #[error("Migration not found: {0}")]
    NotFound(String),

    /// No migration name was supplied
    #[error("Missing migration name")]
    MissingName,

    /// Migration arguments or batch options were unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Batch scope contained an unsafe identifier or condition
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MigrationError {
    /// Create an application error with the given message
    pub fn failed(message: impl Into<String>) -> Self {
        MigrationError::Failed(message.into())
    }

    /// Create a verification error with the given message
    pub fn verification(message: impl Into<String>) -> Self {
        MigrationError::Verification(message.into())
    }

    pub fn is_verification(&self) -> bool {
        matches!(self, MigrationError::Verification(_))
    }

    /// Lookup and usage errors happen before any transaction is opened
    pub fn is_usage(&self) -> bool {
        matches!(self, MigrationError::NotFound(_) | MigrationError::MissingName)
    }
}

/// Return a verification error unless the condition holds.
///
/// ```
/// use customs_orm::{verify, MigrationResult};
///
/// fn check(count: i64) -> MigrationResult<()> {
///     verify!(count == 3, "expected 3 rows, found {}", count);
///     Ok(())
/// }
///
/// assert!(check(3).is_ok());
/// assert_eq!(check(2).unwrap_err().to_string(), "expected 3 rows, found 2");
/// ```
#[macro_export]
macro_rules! verify {
    ($cond:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::MigrationError::Verification(
                ::std::string::String::from(concat!("Condition failed: `", stringify!($cond), "`")),
            ));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return ::core::result::Result::Err($crate::MigrationError::Verification(format!($($arg)+)));
        }
    };
}
