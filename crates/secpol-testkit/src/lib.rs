// SPDX-License-Identifier: MIT OR Apache-2.0
//! secpol-testkit
//!
//! In-process test doubles for the external interfaces a Runtime Policy
//! depends on (`secpol_runtime::PolicyBuilder`, `PipelineController`,
//! `ControllerFactory`): a [`MockPolicyBuilder`] that always succeeds or
//! always fails, and an [`InProcessController`] that reacts to ingested
//! events with a caller-supplied, deterministic "reaction" function and
//! delivers its output/trace lines asynchronously on a spawned task — the
//! same "arrives on an unspecified thread, not the caller's" shape the real
//! Pipeline Controller has, without needing a real policy compiler.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use secpol_core::Event;
use secpol_runtime::{
    ControllerFactory, OutputEvent, OutputSubscription, PipelineController, PipelineExpression,
    PolicyBuilder, TraceSubscription,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// A [`PolicyBuilder`] that always succeeds, producing an empty
/// [`PipelineExpression`].
pub struct AlwaysBuildsPolicyBuilder;

#[async_trait]
impl PolicyBuilder for AlwaysBuildsPolicyBuilder {
    async fn build_policy(&self, _policy_id: &str) -> anyhow::Result<PipelineExpression> {
        Ok(PipelineExpression::new(()))
    }
}

/// A [`PolicyBuilder`] that always fails with a fixed message, simulating a
/// policy compile error (unknown asset, parse failure, etc.).
pub struct FailingPolicyBuilder {
    /// The message the failure carries.
    pub message: String,
}

impl FailingPolicyBuilder {
    /// Create a builder that always fails with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl PolicyBuilder for FailingPolicyBuilder {
    async fn build_policy(&self, policy_id: &str) -> anyhow::Result<PipelineExpression> {
        anyhow::bail!("{}: {}", policy_id, self.message)
    }
}

/// What an [`InProcessController`] produces for one ingested event: the
/// terminal output and zero or more raw trace lines.
#[derive(Debug, Clone, Default)]
pub struct Reaction {
    /// Terminal output pretty-printed string. Falls back to the event's own
    /// `pretty_str()` when `None`.
    pub output: Option<String>,
    /// Raw trace lines emitted by whichever operators "ran" for this event.
    pub traces: Vec<String>,
}

type ReactionFn = dyn Fn(&Event) -> Reaction + Send + Sync;

/// An in-process [`PipelineController`] driven by a caller-supplied reaction
/// function instead of a real compiled pipeline.
pub struct InProcessController {
    output_tx: broadcast::Sender<OutputEvent>,
    trace_tx: broadcast::Sender<String>,
    react: Arc<ReactionFn>,
}

impl InProcessController {
    /// Create a controller that echoes each ingested event's `pretty_str()`
    /// as output and emits no trace lines.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_reaction(|event| Reaction {
            output: Some(event.pretty_str()),
            traces: Vec::new(),
        })
    }

    /// Create a controller driven by a custom reaction function.
    pub fn with_reaction(react: impl Fn(&Event) -> Reaction + Send + Sync + 'static) -> Self {
        let (output_tx, _) = broadcast::channel(256);
        let (trace_tx, _) = broadcast::channel(1024);
        Self {
            output_tx,
            trace_tx,
            react: Arc::new(react),
        }
    }
}

impl PipelineController for InProcessController {
    fn ingest(&self, event: Result<Event, String>) {
        let Ok(event) = event else { return };
        let output_tx = self.output_tx.clone();
        let trace_tx = self.trace_tx.clone();
        let react = Arc::clone(&self.react);
        // Deliver asynchronously, on a task distinct from the caller, to
        // mirror the real controller's "arrives on an unspecified thread"
        // contract rather than the caller's ingest/render thread.
        tokio::spawn(async move {
            let reaction = react(&event);
            let output = reaction.output.unwrap_or_else(|| event.pretty_str());
            let _ = output_tx.send(OutputEvent(output));
            for line in reaction.traces {
                let _ = trace_tx.send(line);
            }
        });
    }

    fn subscribe_output(&self) -> OutputSubscription {
        OutputSubscription::new(self.output_tx.subscribe())
    }

    fn subscribe_traces(&self) -> TraceSubscription {
        TraceSubscription::new(self.trace_tx.subscribe())
    }
}

/// Builds an [`InProcessController`] from any [`PipelineExpression`],
/// ignoring its payload — the testkit's controller does not need one.
pub struct InProcessControllerFactory {
    react: Arc<ReactionFn>,
}

impl InProcessControllerFactory {
    /// Create a factory whose controllers echo each event's `pretty_str()`.
    #[must_use]
    pub fn echo() -> Self {
        Self::with_reaction(|event| Reaction {
            output: Some(event.pretty_str()),
            traces: Vec::new(),
        })
    }

    /// Create a factory whose controllers are driven by a custom reaction
    /// function.
    pub fn with_reaction(react: impl Fn(&Event) -> Reaction + Send + Sync + 'static) -> Self {
        Self {
            react: Arc::new(react),
        }
    }
}

impl ControllerFactory for InProcessControllerFactory {
    fn make_controller(
        &self,
        _expr: PipelineExpression,
    ) -> anyhow::Result<Box<dyn PipelineController>> {
        let react = Arc::clone(&self.react);
        Ok(Box::new(InProcessController::with_reaction(move |event| {
            react(event)
        })))
    }
}
