use std::time::Duration;

use customs_core::config::{CustomsConfig, DEFAULT_BATCH_SIZE, DEFAULT_THROTTLE_SECONDS};

use crate::error::{MigrationError, MigrationResult};

/// Batch size and pause used when iterating a scope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// Maximum rows per batch
    pub batch_size: usize,
    /// Seconds to pause after each batch; zero or negative disables pausing
    pub throttle_seconds: f64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            throttle_seconds: DEFAULT_THROTTLE_SECONDS,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CustomsConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            throttle_seconds: config.throttle_seconds,
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn throttle_seconds(mut self, throttle_seconds: f64) -> Self {
        self.throttle_seconds = throttle_seconds;
        self
    }

    /// Pause to take after a batch, if any
    pub fn pause(&self) -> Option<Duration> {
        if self.throttle_seconds > 0.0 {
            Duration::try_from_secs_f64(self.throttle_seconds).ok()
        } else {
            None
        }
    }

    pub fn validate(&self) -> MigrationResult<()> {
        if self.batch_size == 0 {
            return Err(MigrationError::InvalidArgument(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
