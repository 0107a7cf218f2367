//! External interfaces (§6): the Builder and Pipeline Controller the
//! Runtime Policy depends on but does not implement.
//!
//! Both the *Builder* (compiles a policy id into a pipeline expression) and
//! the *Pipeline Controller* (drives events through that expression and
//! exposes output/trace observables) are out of scope for this crate — only
//! the traits they must satisfy are specified here. `secpol-testkit` ships
//! an in-process implementation of both for tests and demos.

use async_trait::async_trait;
use secpol_core::Event;

/// An opaque, builder-produced pipeline artifact.
///
/// The core never inspects this value; it only hands it to a
/// [`ControllerFactory`] to obtain a [`PipelineController`].
pub struct PipelineExpression {
    inner: Box<dyn std::any::Any + Send>,
}

impl PipelineExpression {
    /// Wrap an arbitrary builder-produced artifact.
    pub fn new<T: std::any::Any + Send>(inner: T) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// Downcast back to the concrete type a particular Builder/Controller
    /// pair agreed on.
    #[must_use]
    pub fn downcast<T: std::any::Any>(self) -> Option<Box<T>> {
        self.inner.downcast().ok()
    }
}

/// Compiles a named policy asset into an executable pipeline expression.
#[async_trait]
pub trait PolicyBuilder: Send + Sync {
    /// Build a [`PipelineExpression`] for `policy_id`.
    ///
    /// # Errors
    ///
    /// Returns an error describing parse or resolution failure; the Runtime
    /// Policy flattens this into [`crate::RuntimeError::BuildFailure`].
    async fn build_policy(&self, policy_id: &str) -> anyhow::Result<PipelineExpression>;
}

/// A single terminal output event: the pretty-printed form of whatever the
/// pipeline produced for one ingested event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent(pub String);

/// A handle for receiving terminal output events from a running pipeline.
pub struct OutputSubscription {
    rx: tokio::sync::broadcast::Receiver<OutputEvent>,
}

impl OutputSubscription {
    /// Wrap a broadcast receiver as an output subscription.
    #[must_use]
    pub fn new(rx: tokio::sync::broadcast::Receiver<OutputEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next output event, waiting asynchronously.
    ///
    /// Returns `None` once the controller has been torn down.
    pub async fn recv(&mut self) -> Option<OutputEvent> {
        loop {
            match self.rx.recv().await {
                Ok(ev) => return Some(ev),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// A handle for receiving raw trace lines from every operator in a pipeline.
pub struct TraceSubscription {
    rx: tokio::sync::broadcast::Receiver<String>,
}

impl TraceSubscription {
    /// Wrap a broadcast receiver as a trace subscription.
    #[must_use]
    pub fn new(rx: tokio::sync::broadcast::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Receive the next raw trace line, waiting asynchronously.
    ///
    /// Returns `None` once the controller has been torn down.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(line) => return Some(line),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// The runtime handle that drives events through a compiled pipeline and
/// exposes its output and trace observables.
///
/// Destruction (`Drop`) must detach all subscribers before returning; the
/// core relies on this to guarantee no further traces are delivered once
/// teardown begins (I4 in the data model).
pub trait PipelineController: Send + Sync {
    /// Submit an event for processing. Non-blocking: the call returns as
    /// soon as the event is accepted, without waiting for it to traverse
    /// the pipeline.
    fn ingest(&self, event: Result<Event, String>);

    /// Subscribe to terminal output events.
    fn subscribe_output(&self) -> OutputSubscription;

    /// Subscribe to raw trace lines from every operator.
    fn subscribe_traces(&self) -> TraceSubscription;
}

/// Wraps a [`PipelineExpression`] into a boxed [`PipelineController`].
///
/// This is the "wrap the expression in a new Controller" step of `build`
/// (spec §4.4), kept as a trait rather than a bare function so different
/// embeddings can vary controller construction (e.g. real vs. test-double).
pub trait ControllerFactory: Send + Sync {
    /// Construct a controller from a builder-produced pipeline expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression cannot be wired into a running
    /// controller (e.g. a downcast mismatch).
    fn make_controller(
        &self,
        expr: PipelineExpression,
    ) -> anyhow::Result<Box<dyn PipelineController>>;
}
