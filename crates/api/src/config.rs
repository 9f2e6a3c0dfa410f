//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `FAILURE_PREDICTOR__*` environment variables
//! (`FAILURE_PREDICTOR__SERVER__ADDR=0.0.0.0:9000`).

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rate_limit::RateLimitConfig;

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "config/failure-predictor.toml";
/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FAILURE_PREDICTOR_CONFIG";
/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "FAILURE_PREDICTOR";

/// Top level service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub validation: ValidationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model artifact (`.json` or postcard)
    pub artifact_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("models/vehicle_failure_artifacts.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Reject readings outside `ranges` before inference
    pub enforce_ranges: bool,
    pub ranges: ValidationConfig,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enforce_ranges: true,
            ranges: ValidationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default file location (or `FAILURE_PREDICTOR_CONFIG`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from a given file (skipped when absent) and the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
