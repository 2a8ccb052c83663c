//! Configuration management for chemviz
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides
//! (applied in that order, later sources win).

use crate::error::{ChemvizError, Result};
use crate::state::session::LogoutPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for chemviz
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Session behaviour
    #[serde(default)]
    pub session: SessionConfig,
    /// Report download settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Terminal rendering settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to each request (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/".to_string()
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

/// Session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// What logout does when the server cannot be reached
    #[serde(default)]
    pub logout_policy: LogoutPolicy,
}

/// Report download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory reports are saved into
    #[serde(default = "default_report_dir")]
    pub output_dir: PathBuf,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_report_dir(),
        }
    }
}

/// Terminal rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Width in characters of the longest chart bar
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Use colored output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_chart_width() -> usize {
    40
}

fn default_color() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chart_width: default_chart_width(),
            color: default_color(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file; `None` uses [`Config::default_path`]
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&str>, cli: &crate::cli::Cli) -> Result<Self> {
        let path = path.map(PathBuf::from).or_else(Self::default_path);

        let mut config = match path {
            Some(p) if p.exists() => Self::from_file(&p)?,
            Some(p) => {
                tracing::warn!("Config file not found at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/chemviz/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chemviz")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChemvizError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChemvizError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CHEMVIZ_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("CHEMVIZ_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(value) => self.api.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring invalid CHEMVIZ_TIMEOUT_SECONDS={}", timeout),
            }
        }

        if let Ok(policy) = std::env::var("CHEMVIZ_LOGOUT_POLICY") {
            match policy.parse::<LogoutPolicy>() {
                Ok(value) => self.session.logout_policy = value,
                Err(e) => tracing::warn!("Ignoring CHEMVIZ_LOGOUT_POLICY: {}", e),
            }
        }

        if let Ok(dir) = std::env::var("CHEMVIZ_REPORT_DIR") {
            self.report.output_dir = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base) = &cli.api_base {
            tracing::debug!("Using API base override from CLI: {}", base);
            self.api.base_url = base.clone();
        }
        if cli.no_color {
            self.display.color = false;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ChemvizError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ChemvizError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 || self.api.timeout_seconds > 600 {
            return Err(ChemvizError::Config(
                "api.timeout_seconds must be between 1 and 600".to_string(),
            )
            .into());
        }

        if !(10..=200).contains(&self.display.chart_width) {
            return Err(ChemvizError::Config(
                "display.chart_width must be between 10 and 200".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
