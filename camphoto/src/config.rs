//! Configuration types and defaults

use camphoto_media::UserConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration or installing logging
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration document could not be parsed
    #[error("Invalid configuration: {source}")]
    Parse {
        /// Parser error
        #[from]
        source: serde_json::Error,
    },

    /// A global subscriber was already installed or the filter was rejected
    #[error("Logging initialization failed: {reason}")]
    LoggingInit {
        /// Failure reason
        reason: String,
    },
}

/// Session-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraPhotoConfig {
    /// Pause between failed max-resolution attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Ladder attempt a fresh session starts from
    pub initial_max_resolution_try: usize,
    /// Default `tracing` filter directive used by [`crate::logging::init_logging`]
    pub log_level: String,
    /// Export options applied under every per-call config
    pub default_export: UserConfig,
    /// Origin used in object URLs minted by the default registry
    pub object_url_origin: String,
}

impl Default for CameraPhotoConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 20,
            initial_max_resolution_try: 1,
            log_level: "info".to_string(),
            default_export: UserConfig::default(),
            object_url_origin: "camphoto".to_string(),
        }
    }
}

impl CameraPhotoConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pause between failed max-resolution attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
