//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file via
//! the `config` crate, overlaid with `BUCKETVIEW__*` environment variables.
//! Each sub-module represents a logical configuration section.

pub mod logging;
pub mod storage;
pub mod transfer;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::storage::StorageConfig;
use self::transfer::TransferConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "BUCKETVIEW";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Object store connection settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Transfer tuning and failure handling.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables prefixed with
    /// `BUCKETVIEW__` (sections separated by `__`) take precedence,
    /// e.g. `BUCKETVIEW__STORAGE__S3__BUCKET`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
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

#[cfg(test)]
mod tests {
    use super::transfer::FailurePolicy;
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load(path.to_str().unwrap()).unwrap();

        assert_eq!(config.transfer.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.transfer.max_attempts, 3);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.s3.region, "us-east-1");
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bucketview.toml");
        std::fs::write(
            &path,
            r#"
[storage.s3]
bucket = "media"
region = "eu-west-1"

[transfer]
failure_policy = "abort"
max_attempts = 5

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.s3.bucket, "media");
        assert_eq!(config.storage.s3.region, "eu-west-1");
        assert_eq!(config.transfer.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.transfer.max_attempts, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.storage.list_page_size, 1000);
    }
}
