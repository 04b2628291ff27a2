use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key is not set. Put it in .examglass/local.yaml or EXAMGLASS_API__API_KEY")]
    MissingApiKey,

    #[error("API base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Model name cannot be empty")]
    EmptyModel,

    #[error("Bridge base URL cannot be empty")]
    EmptyBridgeUrl,

    #[error("Invalid capture quality: {0}. Must be between 1 and 100")]
    InvalidCaptureQuality(u8),

    #[error("Invalid capture size: {0}x{1}. Both dimensions must be positive")]
    InvalidCaptureSize(u32, u32),

    #[error("Invalid max_rounds: {0}. Must be at least 1")]
    InvalidMaxRounds(usize),

    #[error("Invalid capture_interval_secs: 0. Must be positive")]
    ZeroCaptureInterval,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .examglass/config.yaml (project config, created by init)
    /// 3. .examglass/local.yaml (local overrides, usually holds the API key)
    /// 4. Environment variables (EXAMGLASS_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".examglass/config.yaml"))
            .merge(Yaml::file(".examglass/local.yaml"))
            .merge(Env::prefixed("EXAMGLASS_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("EXAMGLASS_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// A missing API key fails here, before the loop starts, rather than on
    /// the first request.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.api.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if config.api.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.api.model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        if config.bridge.base_url.is_empty() {
            return Err(ConfigError::EmptyBridgeUrl);
        }

        if config.capture.quality == 0 || config.capture.quality > 100 {
            return Err(ConfigError::InvalidCaptureQuality(config.capture.quality));
        }

        if config.capture.target_width == 0 || config.capture.target_height == 0 {
            return Err(ConfigError::InvalidCaptureSize(
                config.capture.target_width,
                config.capture.target_height,
            ));
        }

        if config.history.max_rounds == 0 {
            return Err(ConfigError::InvalidMaxRounds(config.history.max_rounds));
        }

        if config.timing.capture_interval_secs == 0 {
            return Err(ConfigError::ZeroCaptureInterval);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
