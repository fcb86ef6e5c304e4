use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the evaluation service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rubric source configuration
    #[serde(default)]
    pub rubric: RubricConfig,

    /// Analysis engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Directory for transient artifact files (system temp dir if unset)
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Comma-separated list of allowed CORS origins, `*` for any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> String {
    "*".to_string()
}

const fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Parsed origin list. `None` means any origin is allowed.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

/// Rubric source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RubricConfig {
    /// Path to a JSON or YAML rubric file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RubricConfig {
    /// The configured rubric path, treating an empty value as unset.
    pub fn source(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Which analysis engine adapter to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Spawn a local analysis program per evaluation
    #[default]
    Command,
    /// Call a remote analysis service over HTTP
    Http,
    /// Scripted engine for demos and tests
    Mock,
}

impl EngineKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Http => "http",
            Self::Mock => "mock",
        }
    }
}

/// Analysis engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,

    /// Program to run for the command engine
    #[serde(default = "default_engine_command")]
    pub command: String,

    /// Arguments placed before `--file` and `--mode`
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,

    /// Endpoint for the http engine
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound for one analysis in seconds
    #[serde(default = "default_engine_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_engine_command() -> String {
    "python3".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["orchestrator.py".to_string()]
}

const fn default_engine_timeout_secs() -> u64 {
    600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            command: default_engine_command(),
            args: default_engine_args(),
            url: None,
            timeout_secs: default_engine_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Also log to stdout
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation (daily, hourly, never)
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: true,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.cors_origins, "*");
        assert!(config.rubric.source().is_none());
        assert_eq!(config.engine.kind, EngineKind::Command);
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let mut server = ServerConfig::default();
        assert!(server.allowed_origins().is_none());

        server.cors_origins = "https://judge.example.com, https://admin.example.com".to_string();
        assert_eq!(
            server.allowed_origins(),
            Some(vec![
                "https://judge.example.com".to_string(),
                "https://admin.example.com".to_string()
            ])
        );

        server.cors_origins = "https://a.example.com,*".to_string();
        assert!(server.allowed_origins().is_none());
    }

    #[test]
    fn test_empty_rubric_path_is_unset() {
        let rubric = RubricConfig {
            path: Some(PathBuf::new()),
        };
        assert!(rubric.source().is_none());
    }
}
