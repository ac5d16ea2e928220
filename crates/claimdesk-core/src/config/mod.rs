//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate.
//! Each sub-module represents a logical configuration section, and every
//! field carries a default so an empty source yields a usable config.

pub mod api;
pub mod logging;
pub mod notifications;
pub mod realtime;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::api::{ApiConfig, TransitionPolicy};
pub use self::logging::LoggingConfig;
pub use self::notifications::NotificationConfig;
pub use self::realtime::RealtimeConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration files
/// (`config/default` + environment overlay + `CLAIMDESK_*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Realtime channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Polling and popup settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Durable and session storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and the environment.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `CLAIMDESK_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLAIMDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the notification core cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage.max_seen_entries == Some(0) {
            return Err(AppError::configuration(
                "storage.max_seen_entries must be at least 1 when set",
            ));
        }
        Ok(())
    }
}
