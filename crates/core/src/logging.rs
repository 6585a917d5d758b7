//! Structured logging setup
//!
//! Logs always go to stderr: stdout is reserved for the migration status line
//! and command output.

use crate::config::{ConfigError, LogFormat, DEFAULT_LOG_LEVEL, LOG_ENV, LOG_FORMAT_ENV};
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level or filter directives (e.g., "info", "customs_orm=debug")
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Environment filter (supports directives like "customs_orm=debug,sqlx=warn")
    pub env_filter: Option<String>,
    /// Include the module target in each line
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
            env_filter: None,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    /// Read `CUSTOMS_LOG` and `CUSTOMS_LOG_FORMAT` through `lookup`
    ///
    /// Unlike `CustomsConfig::from_lookup` this needs no database URL, so
    /// commands that never connect still honor the logging settings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_ENV).filter(|l| !l.trim().is_empty()) {
            validate_filter(&level)?;
            config.level = level;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV).filter(|f| !f.trim().is_empty()) {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter_directive(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

/// Check that `directives` is a level or a set of `EnvFilter` directives
pub fn validate_filter(directives: &str) -> Result<(), ConfigError> {
    EnvFilter::try_new(directives).map(|_| ()).map_err(|_| {
        ConfigError::invalid_value(
            "log_level",
            directives,
            "a level (trace, debug, info, warn, error, off) or filter directives like customs_orm=debug",
        )
    })
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config.filter_directive()))?;

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(config.include_target).json())
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(config.include_target))
            .try_init()?,
    }

    tracing::debug!(level = %config.level, format = %config.format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_from_lookup_reads_level_and_format() {
        let logging = LoggingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.format, LogFormat::Text);

        let logging =
            LoggingConfig::from_lookup(lookup(&[("CUSTOMS_LOG", "debug"), ("CUSTOMS_LOG_FORMAT", "json")])).unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.filter_directive(), "debug");
    }

    #[test]
    fn test_from_lookup_accepts_filter_directives() {
        let logging = LoggingConfig::from_lookup(lookup(&[("CUSTOMS_LOG", "customs_orm=debug,sqlx=warn")])).unwrap();
        assert_eq!(logging.filter_directive(), "customs_orm=debug,sqlx=warn");
    }

    #[test]
    fn test_from_lookup_rejects_bad_settings() {
        let err = LoggingConfig::from_lookup(lookup(&[("CUSTOMS_LOG", "customs_orm=loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "log_level"));

        let err = LoggingConfig::from_lookup(lookup(&[("CUSTOMS_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "log_format"));
    }

    #[test]
    fn test_validate_filter() {
        assert!(validate_filter("INFO").is_ok());
        assert!(validate_filter("customs_orm=trace").is_ok());
        assert!(validate_filter("customs_orm=loud").is_err());
    }

    #[test]
    fn test_env_filter_overrides_level() {
        let logging = LoggingConfig::default().with_env_filter("customs_orm=trace");
        assert_eq!(logging.filter_directive(), "customs_orm=trace");
    }
}
