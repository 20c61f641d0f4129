//! Persistence configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::application::{CoordinatorSettings, Durability};

/// Where identity versions are stored
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    /// Process memory; gone on exit
    #[default]
    Memory,
    /// One checksummed JSON file per profile under `data_dir`
    Filesystem,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: PersistenceBackend,

    /// Root directory of the filesystem backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Whether a failed save fails the update
    #[serde(default)]
    pub durability: Durability,

    /// Reload-and-reapply attempts after a version conflict
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl PersistenceConfig {
    /// Settings handed to the identity coordinator
    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            durability: self.durability,
            max_conflict_retries: self.max_conflict_retries,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == PersistenceBackend::Filesystem && self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingDataDir);
        }
        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::default(),
            data_dir: default_data_dir(),
            durability: Durability::default(),
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_conflict_retries() -> u32 {
    3
}
