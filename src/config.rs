// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the simulation kernel.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. nqs.yaml file
//! 3. Environment variables (NQSCORE_*)
//!
//! The kernel itself is usable without any configuration; an embedding
//! driver loads this once and passes the limits down when it constructs
//! Hilbert spaces and operators.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        // Load from file if specified
        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yml::from_str(&content)?;
            }
        } else {
            // Try default locations
            for path in &["nqs.yaml", "nqs.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yml::from_str(&content)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("NQSCORE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("NQSCORE_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("NQSCORE_STRICT_VALIDATION") {
            self.validation.strict = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("NQSCORE_MAX_SITES") {
            if let Ok(n) = val.parse() {
                self.validation.limits.max_sites = n;
            }
        }
        if let Ok(val) = env::var("NQSCORE_MAX_JUMP_OPERATORS") {
            if let Ok(n) = val.parse() {
                self.validation.limits.max_jump_operators = n;
            }
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.validation.limits.max_sites == 0 {
            return Err(Error::Config("max_sites cannot be 0".into()));
        }
        if self.validation.limits.max_local_dim < 2 {
            return Err(Error::Config("max_local_dim must be at least 2".into()));
        }
        if self.validation.limits.max_layer_size == 0 {
            return Err(Error::Config("max_layer_size cannot be 0".into()));
        }
        if !self.validation.strict {
            tracing::warn!(
                "Strict validation is disabled. Contract violations in caller input \
                 may surface as panics deep in the kernels instead of early errors."
            );
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Strict validation mode
    #[serde(default = "default_true")]
    pub strict: bool,

    /// Resource limits
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: true,
            limits: ResourceLimits::default(),
        }
    }
}

/// Resource limits.
///
/// The connection-enumeration cost of a Lindbladian grows quadratically in
/// the per-operator connection count, and lifted term matrices grow as
/// `local_dim^sites`; these caps keep a misconfigured driver from building
/// an instance that can never finish a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of physical sites
    #[serde(default = "default_max_sites")]
    pub max_sites: u32,

    /// Maximum local basis dimension
    #[serde(default = "default_max_local_dim")]
    pub max_local_dim: u32,

    /// Maximum number of jump operators per Lindbladian
    #[serde(default = "default_max_jump_operators")]
    pub max_jump_operators: u32,

    /// Maximum layer input/output width
    #[serde(default = "default_max_layer_size")]
    pub max_layer_size: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_sites: default_max_sites(),
            max_local_dim: default_max_local_dim(),
            max_jump_operators: default_max_jump_operators(),
            max_layer_size: default_max_layer_size(),
        }
    }
}

fn default_max_sites() -> u32 {
    256
}

fn default_max_local_dim() -> u32 {
    8
}

fn default_max_jump_operators() -> u32 {
    64
}

fn default_max_layer_size() -> u32 {
    16_384
}

fn default_true() -> bool {
    true
}
