//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `TASTE_IDENTITY` prefix
//! and nested values are separated by double underscores. Every section has
//! defaults, so an empty environment yields a working configuration.
//!
//! # Example
//!
//! ```no_run
//! use taste_identity::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod persistence;
mod telemetry;

pub use error::{ConfigError, ValidationError};
pub use persistence::{PersistenceBackend, PersistenceConfig};
pub use telemetry::{LoggingConfig, TelemetryConfig};

use serde::Deserialize;

use crate::domain::scoring::{EvaluatorTuning, ReinforcementTuning};

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Evaluator constants
    #[serde(default)]
    pub scoring: EvaluatorTuning,

    /// Update rule constants
    #[serde(default)]
    pub reinforcement: ReinforcementTuning,

    /// Identity storage backend and write semantics
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Fire-and-forget reporting
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TASTE_IDENTITY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `TASTE_IDENTITY__SCORING__TENSION_THRESHOLD=0.4` -> `scoring.tension_threshold = 0.4`
    /// - `TASTE_IDENTITY__PERSISTENCE__DURABILITY=required` -> `persistence.durability = required`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TASTE_IDENTITY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.scoring.validate()?;
        self.reinforcement.validate()?;
        self.persistence.validate()?;
        self.telemetry.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
