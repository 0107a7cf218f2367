//! Stable, machine-readable error codes shared across the runtime.
//!
//! Mirrors the split used by the platform's wider error taxonomy: a broad
//! [`ErrorCategory`] for grouping/metrics, and a specific [`ErrorCode`] for
//! programmatic matching. Individual crates define their own `thiserror`
//! error enums and map each variant to one of these codes rather than
//! re-deriving the taxonomy per crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad family an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Runtime Policy lifecycle errors (build/ingest state machine).
    Lifecycle,
    /// Errors surfaced by the Builder or Controller during `build`.
    Compile,
    /// Engine configuration errors.
    Config,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lifecycle => "lifecycle",
            Self::Compile => "compile",
            Self::Config => "config",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Machine-readable, stable error code.
///
/// Each variant serializes to a `SCREAMING_SNAKE_CASE` string guaranteed
/// not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// `build` was called on an already-built Runtime Policy.
    AlreadyBuilt,
    /// `ingest` (or another built-state-only operation) was called before `build`.
    NotBuilt,
    /// The Builder or Controller construction failed during `build`.
    BuildFailure,
    /// Engine configuration failed validation.
    ConfigInvalid,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::AlreadyBuilt | Self::NotBuilt => ErrorCategory::Lifecycle,
            Self::BuildFailure => ErrorCategory::Compile,
            Self::ConfigInvalid => ErrorCategory::Config,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation (e.g. `"ALREADY_BUILT"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyBuilt => "ALREADY_BUILT",
            Self::NotBuilt => "NOT_BUILT",
            Self::BuildFailure => "BUILD_FAILURE",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
