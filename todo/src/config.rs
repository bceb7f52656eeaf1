//! Configuration management for the todo application.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default location of the key-value file
pub const DEFAULT_STORAGE_PATH: &str = "todos.json";

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "todo=info,todo_runtime=warn";

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to something that does not parse
    #[error("{name} has invalid value {value:?}: expected {expected}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value found
        value: String,
        /// What would have been accepted
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    pub storage: StorageConfig,
    /// Store runtime configuration
    pub runtime: RuntimeConfig,
    /// Log filter directive for `tracing_subscriber::EnvFilter`
    pub log_filter: String,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON key-value file (`TODO_STORAGE_PATH`)
    pub path: PathBuf,
    /// Run as if the host had no persistent storage (`TODO_STORAGE_DISABLED`)
    pub disabled: bool,
}

/// Store runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Bound on actions processed per gesture (`TODO_MAX_FEEDBACK_ACTIONS`)
    pub max_feedback_actions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: PathBuf::from(DEFAULT_STORAGE_PATH),
                disabled: false,
            },
            runtime: RuntimeConfig {
                max_feedback_actions: 64,
            },
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let path = lookup("TODO_STORAGE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map_or(defaults.storage.path, PathBuf::from);

        let disabled = match lookup("TODO_STORAGE_DISABLED") {
            Some(raw) => parse_bool("TODO_STORAGE_DISABLED", &raw)?,
            None => defaults.storage.disabled,
        };

        let max_feedback_actions = match lookup("TODO_MAX_FEEDBACK_ACTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "TODO_MAX_FEEDBACK_ACTIONS",
                    value: raw,
                    expected: "a positive integer",
                })?,
            None => defaults.runtime.max_feedback_actions,
        };

        let log_filter = lookup("RUST_LOG").unwrap_or(defaults.log_filter);

        Ok(Self {
            storage: StorageConfig { path, disabled },
            runtime: RuntimeConfig {
                max_feedback_actions,
            },
            log_filter,
        })
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            expected: "a boolean (true/false, 1/0, yes/no, on/off)",
        }),
    }
}
