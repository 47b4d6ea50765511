//! Configuration management for Uniqa
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, UniqaError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Uniqa
///
/// This structure holds everything the client needs: where the
/// question-answering service lives and how to behave when it fails.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Answer service API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Fallback answering configuration
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// Answer service API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the question-answering service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for HTTP requests (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Fallback answering configuration
///
/// When enabled, a failed live request is answered with a locally
/// synthesized response instead of surfacing the error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Whether to synthesize an answer when the live service fails
    #[serde(default = "default_fallback_enabled")]
    pub enabled: bool,

    /// Artificial delay before a synthesized answer appears (milliseconds)
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,
}

fn default_fallback_enabled() -> bool {
    true
}

fn default_simulated_latency() -> u64 {
    1500
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: default_fallback_enabled(),
            simulated_latency_ms: default_simulated_latency(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// When no path is given, the platform config directory is consulted;
    /// a missing file there is not an error.
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit path to a configuration file, if any
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if an existing file cannot be read or parsed
    pub fn load(path: Option<&str>, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = match path {
            Some(path) if Path::new(path).exists() => Self::from_file(Path::new(path))?,
            Some(path) => {
                tracing::warn!("Config file not found at {}, using defaults", path);
                Self::default()
            }
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Default configuration file location under the platform config dir
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "uniqa", "uniqa").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| UniqaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| UniqaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("UNIQA_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("UNIQA_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid UNIQA_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(enabled) = std::env::var("UNIQA_FALLBACK_ENABLED") {
            if let Ok(value) = enabled.parse() {
                self.fallback.enabled = value;
            } else {
                tracing::warn!("Invalid UNIQA_FALLBACK_ENABLED: {}", enabled);
            }
        }

        if let Ok(latency) = std::env::var("UNIQA_FALLBACK_LATENCY_MS") {
            if let Ok(value) = latency.parse() {
                self.fallback.simulated_latency_ms = value;
            } else {
                tracing::warn!("Invalid UNIQA_FALLBACK_LATENCY_MS: {}", latency);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            crate::cli::Commands::Chat { no_fallback }
            | crate::cli::Commands::Ask { no_fallback, .. } => {
                if *no_fallback {
                    tracing::debug!("Fallback answers disabled from the command line");
                    self.fallback.enabled = false;
                }
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(UniqaError::Config("API base URL cannot be empty".to_string()).into());
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(UniqaError::Config(format!(
                "Invalid API base URL {}: {}",
                self.api.base_url, e
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(
                UniqaError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }
}
