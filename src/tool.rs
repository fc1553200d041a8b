//! Provisioning tool configuration and validation.
//!
//! This module defines [`ToolConfig`] for locating the provisioning binary
//! and tuning retry behaviour. Configuration is loaded via `ortho-config`
//! which merges defaults, configuration files, and environment variables.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::retry::{DEFAULT_BACKOFF, DEFAULT_MAX_ATTEMPTS, RetryPolicy};

/// Default provisioning binary resolved from `PATH`.
pub const DEFAULT_TOOL_BIN: &str = "tofu";

/// Default pause between retried phase invocations, in seconds.
pub const DEFAULT_RETRY_BACKOFF_SECS: u64 = DEFAULT_BACKOFF.as_secs();

/// Provisioning tool settings loaded via `ortho-config`.
///
/// Any binary speaking the `init`/`validate`/`plan`/`apply`/`destroy`/
/// `output` command protocol works; `tofu` and `terraform` are the known
/// implementations.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SPROBA",
    discovery(
        app_name = "sproba",
        env_var = "SPROBA_CONFIG_PATH",
        config_file_name = "sproba.toml",
        dotfile_name = ".sproba.toml",
        project_file_name = "sproba.toml"
    )
)]
pub struct ToolConfig {
    /// Name or path of the provisioning binary to invoke.
    #[ortho_config(default = DEFAULT_TOOL_BIN.to_owned())]
    pub tool_bin: String,
    /// Maximum invocation attempts per phase when transient failures occur.
    #[ortho_config(default = DEFAULT_MAX_ATTEMPTS)]
    pub retry_max_attempts: u32,
    /// Pause between retried invocations, in seconds.
    #[ortho_config(default = DEFAULT_RETRY_BACKOFF_SECS)]
    pub retry_backoff_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool_bin: DEFAULT_TOOL_BIN.to_owned(),
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff_secs: DEFAULT_RETRY_BACKOFF_SECS,
        }
    }
}

/// Errors raised when loading the tool configuration from layered sources.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ToolConfigLoadError {
    /// Indicates that parsing or merging configuration layers failed.
    #[error("tool configuration parsing failed: {0}")]
    Parse(String),
}

/// Errors raised when the tool configuration fails validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ToolConfigError {
    /// Raised when configuration is missing required values. The error
    /// message includes guidance on how to provide the value via environment
    /// variable or configuration file.
    #[error("missing {field}: set SPROBA_{env_suffix} or add {field} to sproba.toml", env_suffix = field.to_uppercase())]
    InvalidConfig {
        /// Configuration field that failed validation.
        field: String,
    },
    /// Raised when a numeric setting is outside its usable range.
    #[error("{field} must be at least {minimum}, got {actual}")]
    OutOfRange {
        /// Configuration field that failed validation.
        field: String,
        /// Smallest accepted value.
        minimum: u32,
        /// Value found in the merged configuration.
        actual: u32,
    },
}

impl ToolConfig {
    /// Ensures configuration values are usable after trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ToolConfigError::InvalidConfig`] when `tool_bin` is blank
    /// and [`ToolConfigError::OutOfRange`] when `retry_max_attempts` is zero.
    pub fn validate(&self) -> Result<(), ToolConfigError> {
        if self.tool_bin.trim().is_empty() {
            return Err(ToolConfigError::InvalidConfig {
                field: "tool_bin".to_owned(),
            });
        }
        if self.retry_max_attempts == 0 {
            return Err(ToolConfigError::OutOfRange {
                field: "retry_max_attempts".to_owned(),
                minimum: 1,
                actual: 0,
            });
        }
        Ok(())
    }

    /// Loads configuration using defaults, configuration files, and
    /// environment variables, ignoring process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolConfigLoadError::Parse`] when merging sources fails.
    pub fn load_without_cli_args() -> Result<Self, ToolConfigLoadError> {
        Self::load_from_iter([std::ffi::OsString::from("sproba")])
            .map_err(|err| ToolConfigLoadError::Parse(err.to_string()))
    }

    /// Loads configuration using the default argument iterator.
    ///
    /// # Errors
    ///
    /// Returns [`ToolConfigLoadError::Parse`] when merging sources fails.
    pub fn load_from_sources() -> Result<Self, ToolConfigLoadError> {
        Self::load().map_err(|err| ToolConfigLoadError::Parse(err.to_string()))
    }

    /// Builds the retry policy implied by the configured tuning knobs.
    ///
    /// The policy recognises the default transient failure signatures; the
    /// attempt ceiling and backoff come from configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::transient_defaults()
            .with_max_attempts(self.retry_max_attempts)
            .with_backoff(Duration::from_secs(self.retry_backoff_secs))
    }
}
