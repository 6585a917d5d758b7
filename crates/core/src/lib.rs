//! # customs-core
//!
//! Shared foundation for the data customs crates: configuration loaded from
//! the environment and `tracing` subscriber setup.

pub mod config;
pub mod logging;
pub mod naming;

pub use config::{ConfigError, ConfigSource, CustomsConfig, LogFormat};
pub use logging::{init_logging, validate_filter, LoggingConfig};

