//! Configuration module for the dispatcher
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`DISPATCHER_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use dispatcher::config::DispatcherConfig;
//!
//! let config = DispatcherConfig::default();
//! assert_eq!(config.workers.len(), 3);
//!
//! let toml = r#"
//! [execution]
//! timeout_secs = 60
//! "#;
//! let config: DispatcherConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.execution.timeout_secs, 60);
//! ```

pub mod council;
pub mod error;
pub mod execution;
pub mod logging;
pub mod worker;

pub use council::CouncilConfig;
pub use error::ConfigError;
pub use execution::ExecutionConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use worker::{default_workers, TrackerConfig, WorkerConfig, WorkerKind};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dispatcher.toml";

/// Unified dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Worker process settings
    pub execution: ExecutionConfig,
    /// Council mode settings
    pub council: CouncilConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Worker definitions, in registration order
    pub workers: Vec<WorkerConfig>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            council: CouncilConfig::default(),
            logging: LoggingConfig::default(),
            workers: default_workers(),
        }
    }
}

impl DispatcherConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, `dispatcher.toml` in the working directory is used when
    /// present; otherwise defaults apply. An explicit path that doesn't exist
    /// is a NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                Self::from_file(p)
            }
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(&fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a TOML document. An empty `workers` list falls back to the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.workers.is_empty() {
            config.workers = default_workers();
        }
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supports DISPATCHER_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("DISPATCHER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DISPATCHER_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(timeout) = std::env::var("DISPATCHER_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.execution.timeout_secs = t;
            }
        }
        if let Ok(timeout) = std::env::var("DISPATCHER_COUNCIL_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.council.timeout_secs = t;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "execution.timeout_secs".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.council.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "council.timeout_secs".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, worker) in self.workers.iter().enumerate() {
            let id = worker.id.trim().to_lowercase();
            if id.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("workers[{}].id", i),
                    message: "id cannot be empty".to_string(),
                });
            }
            if worker.command().trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("workers[{}].command", i),
                    message: "command cannot be empty".to_string(),
                });
            }
            if worker.price_per_1k.is_nan() || worker.price_per_1k < 0.0 {
                return Err(ConfigError::Validation {
                    field: format!("workers[{}].price_per_1k", i),
                    message: "price cannot be negative".to_string(),
                });
            }
            for name in std::iter::once(&id).chain(worker.aliases.iter()) {
                let name = name.trim().to_lowercase();
                if !seen.insert(name.clone()) {
                    return Err(ConfigError::DuplicateWorker(name));
                }
            }
        }

        Ok(())
    }
}
