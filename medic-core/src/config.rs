//! Configuration management for Medic
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (MEDIC_*)
//! 3. Config file (~/.config/medic/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use humantime_serde::re::humantime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Where the agent backend lives and which routes it serves
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the agent backend
    pub base_url: String,

    /// Route returning the current run status
    pub status_path: String,

    /// Route accepting new run requests
    pub start_run_path: String,

    /// Route looking up deployment build logs
    pub deployment_logs_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            status_path: "/status".to_string(),
            start_run_path: "/start-autonomous-run".to_string(),
            deployment_logs_path: "/vercel-logs".to_string(),
        }
    }
}

/// Timing of the synchronization engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Period between status polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Upper bound for any single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend endpoints
    pub api: ApiConfig,

    /// Poll cadence and timeouts
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validated()
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/medic/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("medic").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - MEDIC_BASE_URL: Agent backend base URL
    /// - MEDIC_POLL_INTERVAL: Poll period, e.g. "2s"
    /// - MEDIC_REQUEST_TIMEOUT: Request timeout, e.g. "10s"
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base_url) = std::env::var("MEDIC_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(interval) = std::env::var("MEDIC_POLL_INTERVAL") {
            self.sync.poll_interval = parse_duration("MEDIC_POLL_INTERVAL", &interval)?;
        }

        if let Ok(timeout) = std::env::var("MEDIC_REQUEST_TIMEOUT") {
            self.sync.request_timeout = parse_duration("MEDIC_REQUEST_TIMEOUT", &timeout)?;
        }

        self.validated()
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        base_url: Option<String>,
        poll_interval: Option<Duration>,
    ) -> Result<Self> {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }

        if let Some(interval) = poll_interval {
            self.sync.poll_interval = interval;
        }

        self.validated()
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        base_url: Option<String>,
        poll_interval: Option<Duration>,
    ) -> Result<Self> {
        Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(base_url, poll_interval)
    }

    /// Reject settings the engine cannot run with
    fn validated(self) -> Result<Self> {
        if self.sync.poll_interval.is_zero() {
            return Err(Error::Config("poll_interval must be greater than zero".to_string()));
        }
        if self.sync.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        Ok(self)
    }
}

fn parse_duration(name: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.status_path, "/status");
        assert_eq!(config.sync.poll_interval, Duration::from_secs(2));
        assert_eq!(config.sync.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_cli_overrides(
                Some("http://agent.internal:9000".to_string()),
                Some(Duration::from_millis(500)),
            )
            .unwrap();

        assert_eq!(config.api.base_url, "http://agent.internal:9000");
        assert_eq!(config.sync.poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = Config::default().with_cli_overrides(None, Some(Duration::ZERO));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[api]
base_url = "http://127.0.0.1:8080"
deployment_logs_path = "/deployment-logs"

[sync]
poll_interval = "1s 500ms"
request_timeout = "30s"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.api.deployment_logs_path, "/deployment-logs");
        assert_eq!(config.api.start_run_path, "/start-autonomous-run");
        assert_eq!(config.sync.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.sync.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[sync]
poll_interval = "5s"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // Everything else should use defaults
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.sync.poll_interval, Duration::from_secs(5));
        assert_eq!(config.sync.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_file_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sync]\npoll_interval = \"often\"").unwrap();

        let result = Config::load_from_file(&file.path().to_path_buf());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_duration_error_names_variable() {
        let err = parse_duration("MEDIC_POLL_INTERVAL", "fast").unwrap_err();
        assert!(err.to_string().contains("MEDIC_POLL_INTERVAL"));
    }
}
