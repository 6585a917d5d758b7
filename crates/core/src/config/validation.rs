use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Create a missing environment variable error
    pub fn missing_env_var(var: impl Into<String>) -> Self {
        Self::MissingEnvVar { var: var.into() }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, value: &T) -> Result<(), ConfigError>;
}

/// Database URL validator
pub struct DatabaseUrlValidator {
    pub schemes: Vec<String>,
}

impl Default for DatabaseUrlValidator {
    fn default() -> Self {
        Self {
            schemes: vec![
                "postgres".to_string(),
                "postgresql".to_string(),
                "sqlite".to_string(),
            ],
        }
    }
}

impl ConfigValidator<str> for DatabaseUrlValidator {
    fn validate(&self, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() {
            return Err(ConfigError::invalid_value(
                "database_url",
                value,
                "non-empty database URL",
            ));
        }

        // `sqlite::memory:` is not a hierarchical URL, so only the scheme is checked
        let scheme = value.split(':').next().unwrap_or_default();
        if !self.schemes.iter().any(|s| s == scheme) {
            return Err(ConfigError::invalid_value(
                "database_url",
                value,
                format!("URL with scheme: {}", self.schemes.join(", ")),
            ));
        }

        if scheme != "sqlite" {
            url::Url::parse(value).map_err(|e| {
                ConfigError::invalid_value("database_url", value, format!("valid URL ({})", e))
            })?;
        }

        Ok(())
    }
}

/// Lower bound validator for counts
pub struct MinimumValidator {
    pub field: &'static str,
    pub min: usize,
}

impl ConfigValidator<usize> for MinimumValidator {
    fn validate(&self, value: &usize) -> Result<(), ConfigError> {
        if *value < self.min {
            return Err(ConfigError::invalid_value(
                self.field,
                value.to_string(),
                format!("a number of at least {}", self.min),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_validator() {
        let validator = DatabaseUrlValidator::default();

        assert!(validator.validate("postgres://localhost/app").is_ok());
        assert!(validator.validate("postgresql://user:pw@db:5432/app").is_ok());
        assert!(validator.validate("sqlite::memory:").is_ok());
        assert!(validator.validate("sqlite://data.db?mode=rwc").is_ok());
        assert!(validator.validate("mysql://localhost/app").is_err());
        assert!(validator.validate("").is_err());
        assert!(validator.validate("not-a-url").is_err());
    }

    #[test]
    fn test_minimum_validator() {
        let validator = MinimumValidator { field: "batch_size", min: 1 };

        assert!(validator.validate(&1).is_ok());
        assert!(validator.validate(&1000).is_ok());

        let err = validator.validate(&0).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }
}
