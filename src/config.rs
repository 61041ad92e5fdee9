//! Configuration management for slimify
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Command-line flags override individual fields in the CLI handlers.
//!
//! # Environment Variables
//!
//! - `SLIMIFY_WORKFLOW_DIR`: Workflow directory relative to the repository root - default: ".github/workflows"
//! - `SLIMIFY_LOG_LEVEL`: Logging level - default: "info"
//! - `SLIMIFY_REQUEST_TIMEOUT`: GitHub API timeout in seconds - default: "30"
//! - `SLIMIFY_COMPAT_TABLE`: Path to a YAML/JSON list of commands missing on ubuntu-slim (optional)
//! - `GITHUB_API_URL`: GitHub API endpoint - default: "https://api.github.com"
//! - `GITHUB_TOKEN` / `GH_TOKEN`: API token (optional, first one set wins)
//!
//! # Example
//!
//! ```no_run
//! use slimify::SlimifyConfig;
//!
//! let config = SlimifyConfig::default();
//! config.validate().expect("Invalid configuration");
//! let table = config.compatibility_table().expect("Invalid compatibility table");
//! ```

use crate::commands::{CompatibilityTable, TableError};
use crate::github::DEFAULT_API_URL;
use crate::scan::DEFAULT_WORKFLOW_DIR;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// The compatibility table could not be loaded
    #[error(transparent)]
    CompatibilityTable(#[from] TableError),
}

#[derive(Clone)]
pub struct SlimifyConfig {
    /// Workflow directory, relative to the repository root
    pub workflow_dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// GitHub API request timeout in seconds
    pub request_timeout_secs: u64,

    /// Optional override for the built-in compatibility table
    pub compat_table_path: Option<PathBuf>,

    /// GitHub API endpoint
    pub github_api_url: String,

    /// GitHub API token
    pub github_token: Option<String>,
}

impl Default for SlimifyConfig {
    /// Loads the configuration from `SLIMIFY_*` and GitHub environment variables
    fn default() -> Self {
        let workflow_dir = env::var("SLIMIFY_WORKFLOW_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORKFLOW_DIR));

        let log_level = env::var("SLIMIFY_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let request_timeout_secs = env::var("SLIMIFY_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let compat_table_path = env::var("SLIMIFY_COMPAT_TABLE").ok().map(PathBuf::from);

        let github_api_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let github_token = ["GITHUB_TOKEN", "GH_TOKEN"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .find(|token| !token.is_empty());

        Self {
            workflow_dir,
            log_level,
            request_timeout_secs,
            compat_table_path,
            github_api_url,
            github_token,
        }
    }
}

impl SlimifyConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if the timeout is outside
    /// 1..=600 seconds or the log level is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The built-in table, or the one at `compat_table_path` when set
    pub fn compatibility_table(&self) -> Result<CompatibilityTable, ConfigError> {
        match &self.compat_table_path {
            Some(path) => Ok(CompatibilityTable::from_file(path)?),
            None => Ok(CompatibilityTable::default()),
        }
    }
}

impl fmt::Debug for SlimifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlimifyConfig")
            .field("workflow_dir", &self.workflow_dir)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("compat_table_path", &self.compat_table_path)
            .field("github_api_url", &self.github_api_url)
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Display for SlimifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Slimify Configuration:")?;
        writeln!(f, "  Workflow Dir: {}", self.workflow_dir.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        if let Some(ref path) = self.compat_table_path {
            writeln!(f, "  Compatibility Table: {}", path.display())?;
        }
        writeln!(f, "  GitHub API: {}", self.github_api_url)?;
        writeln!(
            f,
            "  GitHub Token: {}",
            if self.github_token.is_some() { "set" } else { "not set" }
        )?;
        Ok(())
    }
}
