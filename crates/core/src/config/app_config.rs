use crate::config::{ConfigError, ConfigSource, ConfigValidator, DatabaseUrlValidator, MinimumValidator};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_THROTTLE_SECONDS: f64 = 0.01;
pub const DEFAULT_MIGRATIONS_DIR: &str = "src/data_migrations";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub const LOG_ENV: &str = "CUSTOMS_LOG";
pub const LOG_FORMAT_ENV: &str = "CUSTOMS_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" | "compact" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::invalid_value("log_format", s, "text or json")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Runtime configuration for running data migrations
#[derive(Debug, Clone)]
pub struct CustomsConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub batch_size: usize,
    pub throttle_seconds: f64,
    /// Raw isolation level name; parsed by the ORM when a transaction begins
    pub isolation_level: Option<String>,
    pub migrations_dir: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    sources: BTreeMap<String, ConfigSource>,
}

impl CustomsConfig {
    /// Create a configuration with defaults for everything but the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert("database_url".to_string(), ConfigSource::Programmatic);

        Self {
            database_url: database_url.into(),
            max_connections: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            throttle_seconds: DEFAULT_THROTTLE_SECONDS,
            isolation_level: None,
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Text,
            sources,
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = BTreeMap::new();
        let mut read = |field: &str, key: &str, default: Option<&str>| -> Option<String> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(value) => {
                    sources.insert(field.to_string(), ConfigSource::EnvVar(key.to_string()));
                    Some(value)
                }
                None => {
                    if let Some(default) = default {
                        sources.insert(field.to_string(), ConfigSource::Default(default.to_string()));
                    }
                    default.map(str::to_string)
                }
            }
        };

        let database_url = read("database_url", "DATABASE_URL", None)
            .ok_or_else(|| ConfigError::missing_env_var("DATABASE_URL"))?;
        let max_connections = read("max_connections", "CUSTOMS_MAX_CONNECTIONS", Some("1"));
        let batch_size = read("batch_size", "CUSTOMS_BATCH_SIZE", Some("1000"));
        let throttle_seconds = read("throttle_seconds", "CUSTOMS_THROTTLE_SECONDS", Some("0.01"));
        let isolation_level = read("isolation_level", "CUSTOMS_ISOLATION_LEVEL", None);
        let migrations_dir = read("migrations_dir", "CUSTOMS_MIGRATIONS_DIR", Some(DEFAULT_MIGRATIONS_DIR));
        let log_level = read("log_level", LOG_ENV, Some(DEFAULT_LOG_LEVEL));
        let log_format = read("log_format", LOG_FORMAT_ENV, Some("text"));

        let config = Self {
            database_url,
            max_connections: parse_field("max_connections", max_connections, "positive integer")?,
            batch_size: parse_field("batch_size", batch_size, "positive integer")?,
            throttle_seconds: parse_field("throttle_seconds", throttle_seconds, "number of seconds")?,
            isolation_level,
            migrations_dir: PathBuf::from(migrations_dir.unwrap_or_default()),
            log_level: log_level.unwrap_or_default(),
            log_format: log_format.unwrap_or_default().parse()?,
            sources,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        DatabaseUrlValidator::default().validate(self.database_url.as_str())?;

        MinimumValidator { field: "max_connections", min: 1 }
            .validate(&(self.max_connections as usize))?;
        MinimumValidator { field: "batch_size", min: 1 }.validate(&self.batch_size)?;

        if !self.throttle_seconds.is_finite() {
            return Err(ConfigError::invalid_value(
                "throttle_seconds",
                self.throttle_seconds.to_string(),
                "a finite number of seconds",
            ));
        }

        crate::logging::validate_filter(&self.log_level)
    }

    /// Where each field's value came from
    pub fn config_sources(&self) -> &BTreeMap<String, ConfigSource> {
        &self.sources
    }

    /// Database URL with any password replaced by `***`
    pub fn masked_database_url(&self) -> String {
        url::Url::parse(&self.database_url)
            .map(|mut url| {
                if url.password().is_some() {
                    let _ = url.set_password(Some("***"));
                }
                url.to_string()
            })
            .unwrap_or_else(|_| self.database_url.clone())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self.sources.insert("batch_size".to_string(), ConfigSource::Programmatic);
        self
    }

    pub fn with_throttle_seconds(mut self, throttle_seconds: f64) -> Self {
        self.throttle_seconds = throttle_seconds;
        self.sources.insert("throttle_seconds".to_string(), ConfigSource::Programmatic);
        self
    }

    pub fn with_isolation_level(mut self, level: impl Into<String>) -> Self {
        self.isolation_level = Some(level.into());
        self.sources.insert("isolation_level".to_string(), ConfigSource::Programmatic);
        self
    }
}

fn parse_field<T: FromStr>(field: &str, value: Option<String>, expected: &str) -> Result<T, ConfigError> {
    let value = value.unwrap_or_default();
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid_value(field, value.clone(), expected))
}
