use customs_core::CustomsConfig;
use customs_orm::{MigrationArgs, MigrationError, MigrationRegistry, Runner};

use crate::error::CliError;

/// Command line overrides on top of the environment configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub batch_size: Option<usize>,
    pub throttle: Option<f64>,
    pub isolation_level: Option<String>,
}

impl RunOptions {
    pub fn apply(&self, mut config: CustomsConfig) -> CustomsConfig {
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(throttle) = self.throttle {
            config = config.with_throttle_seconds(throttle);
        }
        if let Some(level) = &self.isolation_level {
            config = config.with_isolation_level(level.clone());
        }
        config
    }
}

/// Resolve the name before touching configuration or the database
pub fn resolve_name<'a>(registry: &MigrationRegistry, name: Option<&'a str>) -> Result<&'a str, MigrationError> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(MigrationError::MissingName)?;

    if !registry.contains(name) {
        return Err(MigrationError::NotFound(name.to_string()));
    }
    Ok(name)
}

pub async fn run(
    registry: &MigrationRegistry,
    name: Option<&str>,
    args: Option<&str>,
    options: &RunOptions,
) -> Result<(), CliError> {
    let name = resolve_name(registry, name)?;
    let args = MigrationArgs::from_comma_list(args.unwrap_or_default());

    let config = options.apply(CustomsConfig::from_env()?);
    config.validate()?;
    tracing::debug!(
        database_url = %config.masked_database_url(),
        batch_size = config.batch_size,
        throttle_seconds = config.throttle_seconds,
        "Running data migration {}",
        name
    );

    let runner = Runner::connect(&config).await?;
    runner.run_named(registry, name, args).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name() {
        let registry = MigrationRegistry::new();
        assert!(matches!(resolve_name(&registry, None), Err(MigrationError::MissingName)));
        assert!(matches!(resolve_name(&registry, Some("  ")), Err(MigrationError::MissingName)));
    }

    #[test]
    fn test_unknown_name() {
        let err = resolve_name(&MigrationRegistry::new(), Some("non_existent_migration")).unwrap_err();
        assert_eq!(err.to_string(), "Migration not found: non_existent_migration");
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let options = RunOptions {
            batch_size: Some(50),
            throttle: Some(-1.0),
            isolation_level: Some("serializable".to_string()),
        };
        let config = options.apply(CustomsConfig::new("sqlite::memory:"));

        assert_eq!(config.batch_size, 50);
        assert_eq!(config.throttle_seconds, -1.0);
        assert_eq!(config.isolation_level.as_deref(), Some("serializable"));
        assert!(config.config_sources()["batch_size"].to_string().contains("Programmatically"));
    }
}
