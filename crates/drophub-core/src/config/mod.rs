//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod policy;
pub mod simulator;
pub mod store;

use serde::{Deserialize, Serialize};

pub use logging::LoggingConfig;
pub use policy::PolicyConfig;
pub use simulator::SimulatorConfig;
pub use store::{HttpStoreConfig, StoreBackend, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Every section has full defaults, so an absent configuration file
/// yields a working memory-backed setup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Upload validation policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Simulated transfer cadence.
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables prefixed with
    /// `DROPHUB__` override file values (e.g.
    /// `DROPHUB__STORE__BACKEND=http`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DROPHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
