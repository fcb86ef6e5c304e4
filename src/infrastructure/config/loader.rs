use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, EngineKind};

/// Project config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hackeval.yaml";

/// Prefix for nested environment overrides, e.g. `HACKEVAL_ENGINE__KIND`.
pub const ENV_PREFIX: &str = "HACKEVAL_";

/// Plain variables understood by existing deployments.
const DEPLOYMENT_VARS: [&str; 3] = ["EVAL_PARAMS_FILE", "CORS_ORIGINS", "PORT"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid max_upload_bytes: {0}. Must be at least 1")]
    InvalidUploadLimit(usize),

    #[error("Invalid engine timeout: {0}s. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Command engine requires a non-empty command")]
    MissingCommand,

    #[error("HTTP engine requires engine.url")]
    MissingUrl,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. ./hackeval.yaml (optional)
    /// 3. `explicit` config file (must exist when given)
    /// 4. Environment variables (HACKEVAL_* prefix, `__` for nesting)
    /// 5. Deployment variables: EVAL_PARAMS_FILE, CORS_ORIGINS, PORT
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(DEFAULT_CONFIG_FILE));

        if let Some(path) = explicit {
            anyhow::ensure!(
                path.is_file(),
                "Config file not found: {}",
                path.display()
            );
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(deployment_env())
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        if config.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit(
                config.server.max_upload_bytes,
            ));
        }

        // Engine
        if config.engine.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.engine.timeout_secs));
        }

        match config.engine.kind {
            EngineKind::Command if config.engine.command.trim().is_empty() => {
                return Err(ConfigError::MissingCommand);
            }
            EngineKind::Http
                if config
                    .engine
                    .url
                    .as_deref()
                    .is_none_or(|url| url.trim().is_empty()) =>
            {
                return Err(ConfigError::MissingUrl);
            }
            _ => {}
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }
}

/// Map the plain deployment variables onto their nested config keys.
fn deployment_env() -> Env {
    Env::raw().only(&DEPLOYMENT_VARS).map(|key| {
        if key == "EVAL_PARAMS_FILE" {
            "rubric.path".into()
        } else if key == "CORS_ORIGINS" {
            "server.cors_origins".into()
        } else {
            "server.port".into()
        }
    })
}
