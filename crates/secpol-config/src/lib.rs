// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and defaults for the security policy
//! runtime's [`EngineConfig`].
//!
//! The core Runtime Policy itself takes no files, environment variables, or
//! persistent state — this crate exists for the handful of tunables an
//! embedding application wants to set once at startup (channel capacities,
//! per-asset verbose-trace retention).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed.
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A channel capacity is unusually small and may cause avoidable lag.
    SmallCapacity {
        /// Which field this applies to.
        field: String,
        /// The configured value.
        value: usize,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmallCapacity { field, value } => {
                write!(f, "'{field}' is small ({value}); subscribers may lag under load")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Tunables for a Runtime Policy's internal channels and buffers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capacity of the broadcast channel carrying terminal output events.
    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,

    /// Capacity of the broadcast channel carrying raw trace lines.
    #[serde(default = "default_trace_capacity")]
    pub trace_capacity: usize,

    /// Maximum number of raw verbose lines retained per asset before the
    /// oldest is dropped. `None` means unbounded, matching the original's
    /// observed behavior.
    #[serde(default)]
    pub max_verbose_per_asset: Option<usize>,
}

const fn default_output_capacity() -> usize {
    64
}

const fn default_trace_capacity() -> usize {
    1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_capacity: default_output_capacity(),
            trace_capacity: default_trace_capacity(),
            max_verbose_per_asset: None,
        }
    }
}

/// Load an [`EngineConfig`] from an optional TOML file path.
///
/// Returns [`EngineConfig::default()`] when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Parse an [`EngineConfig`] from a TOML string.
pub fn parse_toml(content: &str) -> Result<EngineConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

/// Validate an [`EngineConfig`], returning advisory warnings.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] if `max_verbose_per_asset` is
/// `Some(0)`, which would silently discard every detailed trace line.
pub fn validate_config(config: &EngineConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut reasons = Vec::new();
    if config.max_verbose_per_asset == Some(0) {
        reasons.push("max_verbose_per_asset must not be 0 (use None to disable)".to_string());
    }
    if !reasons.is_empty() {
        return Err(ConfigError::ValidationError { reasons });
    }

    let mut warnings = Vec::new();
    if config.output_capacity < 8 {
        warnings.push(ConfigWarning::SmallCapacity {
            field: "output_capacity".to_string(),
            value: config.output_capacity,
        });
    }
    if config.trace_capacity < 8 {
        warnings.push(ConfigWarning::SmallCapacity {
            field: "trace_capacity".to_string(),
            value: config.trace_capacity,
        });
    }
    Ok(warnings)
}
