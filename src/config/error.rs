//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid tuning: {0}")]
    InvalidTuning(#[from] crate::domain::foundation::ValidationError),

    #[error("Filesystem persistence requires a data directory")]
    MissingDataDir,

    #[error("Telemetry queue capacity must be at least 1")]
    InvalidQueueCapacity,

    #[error("Log filter must not be empty")]
    EmptyLogFilter,
}
