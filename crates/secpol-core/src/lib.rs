// SPDX-License-Identifier: MIT OR Apache-2.0
//! secpol-core
//!
//! The stable contract shared by every crate in the security policy
//! runtime: the policy identifier, the event envelope, the structured
//! [`Value`] document it carries, and the shared [`error`] code taxonomy.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Stable error codes shared across the runtime's crates.
pub mod error;
/// The structured document tree carried by an [`Event`].
pub mod value;

pub use error::{ErrorCategory, ErrorCode};
pub use value::Value;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier naming a policy asset, e.g. `policy/brute-force/0`.
///
/// Immutable once a Runtime Policy is constructed with one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(String);

impl PolicyId {
    /// Wrap a raw string as a policy id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A single event injected into a pipeline.
///
/// Wraps a [`Value`] document. The engine treats it as opaque: it is handed
/// to the [`PipelineController`](crate) on ingress and, on egress, rendered
/// through [`Value::pretty_str`].
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: Value,
}

impl Event {
    /// Wrap a structured document as an event.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Borrow the underlying document.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Pretty-print the event's payload, matching the original's
    /// `payload.prettyStr()` contract.
    #[must_use]
    pub fn pretty_str(&self) -> String {
        self.payload.pretty_str()
    }
}

impl From<serde_json::Value> for Event {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_id_displays_as_its_raw_string() {
        let id = PolicyId::new("policy/brute-force/0");
        assert_eq!(id.to_string(), "policy/brute-force/0");
        assert_eq!(id.as_str(), "policy/brute-force/0");
    }

    #[test]
    fn event_pretty_str_delegates_to_value() {
        let event: Event = serde_json::json!({"a": 1}).into();
        assert_eq!(event.pretty_str(), "{\n  \"a\": 1\n}\n");
    }
}
