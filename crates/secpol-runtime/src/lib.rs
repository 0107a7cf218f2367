// SPDX-License-Identifier: MIT OR Apache-2.0
//! secpol-runtime
//!
//! Runtime policy execution engine for security-event pipelines.
//!
//! Responsibilities:
//! - instantiate a policy graph into a live pipeline via an external
//!   [`PolicyBuilder`] and [`ControllerFactory`]
//! - ingest individual events and capture terminal output
//! - demultiplex the pipeline's free-form trace stream per asset
//! - render a combined output+trace artifact for a caller-chosen
//!   [`DebugMode`]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Per-asset ordered trace storage (C2).
pub mod buffer;
/// Trace line parsing into condition/verbose records (C1).
pub mod classify;
/// External Builder/Controller interfaces (§6).
pub mod controller;
/// Single-slot, last-writer-wins output holder (C3).
pub mod latch;
/// The Runtime Policy itself (C4).
pub mod policy;
/// Combines output + trace state into the `render` result (C5).
pub mod render;

pub use buffer::{ConditionRecord, TraceBuffer};
pub use classify::{classify, Classification};
pub use controller::{
    ControllerFactory, OutputEvent, OutputSubscription, PipelineController, PipelineExpression,
    PolicyBuilder, TraceSubscription,
};
pub use latch::OutputLatch;
pub use policy::{RuntimeError, RuntimePolicy};
pub use render::{escape_asset_segment, pretty_print_trace, DebugMode};

pub use secpol_core::{Event, PolicyId, Value};
