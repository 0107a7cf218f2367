//! Runtime Policy (C4).
//!
//! Owns a built pipeline, ingests events, captures terminal output via the
//! [`OutputLatch`], demultiplexes the trace stream through the
//! [`classify`](crate::classify) function into the [`TraceBuffer`], and
//! renders a combined output+trace artifact for a caller-chosen
//! [`DebugMode`].

use crate::buffer::TraceBuffer;
use crate::classify::{classify, Classification};
use crate::controller::{ControllerFactory, PipelineController};
use crate::render::{pretty_print_trace, render_compact_trace, render_detailed_trace, DebugMode};
use secpol_core::{ErrorCode, PolicyId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::PolicyBuilder;
use crate::latch::OutputLatch;

/// Errors surfaced across the Runtime Policy's public boundary.
///
/// Every variant maps to a stable [`ErrorCode`] via [`RuntimeError::code`]
/// so embedding callers can match on the code rather than message text.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// `build` was called while already [`PolicyState::Built`].
    #[error("policy '{policy_id}' is already built")]
    AlreadyBuilt {
        /// The policy id that was already built.
        policy_id: String,
    },

    /// `ingest` was called while still [`PolicyState::Unbuilt`].
    #[error("policy '{policy_id}' is not built")]
    NotBuilt {
        /// The policy id that has not been built yet.
        policy_id: String,
    },

    /// The Builder or Controller construction failed during `build`.
    #[error("Error building policy [{policy_id}]: {source}")]
    BuildFailure {
        /// The policy id that failed to build.
        policy_id: String,
        /// The underlying cause chain.
        #[source]
        source: anyhow::Error,
    },
}

impl RuntimeError {
    /// The stable error code for this variant.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyBuilt { .. } => ErrorCode::AlreadyBuilt,
            Self::NotBuilt { .. } => ErrorCode::NotBuilt,
            Self::BuildFailure { .. } => ErrorCode::BuildFailure,
        }
    }
}

/// The Runtime Policy's lifecycle state (I4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Unbuilt,
    Built,
}

struct BuiltState {
    controller: Box<dyn PipelineController>,
    output_task: JoinHandle<()>,
    trace_task: JoinHandle<()>,
}

impl Drop for BuiltState {
    fn drop(&mut self) {
        // Detach both subscriber tasks before the controller itself drops,
        // so no trace or output can be delivered once teardown begins.
        self.output_task.abort();
        self.trace_task.abort();
    }
}

/// A stateful, single-instance runtime policy: build it once, ingest events,
/// and render output/trace snapshots.
pub struct RuntimePolicy {
    id: PolicyId,
    state: Mutex<LifecycleState>,
    built: Mutex<Option<BuiltState>>,
    output_latch: Arc<OutputLatch>,
    trace_buffer: Arc<TraceBuffer>,
}

impl RuntimePolicy {
    /// Create a new, unbuilt Runtime Policy for `policy_id`.
    #[must_use]
    pub fn new(policy_id: impl Into<PolicyId>, max_verbose_per_asset: Option<usize>) -> Self {
        Self {
            id: policy_id.into(),
            state: Mutex::new(LifecycleState::Unbuilt),
            built: Mutex::new(None),
            output_latch: Arc::new(OutputLatch::new()),
            trace_buffer: Arc::new(TraceBuffer::new(max_verbose_per_asset)),
        }
    }

    /// The policy id this instance was constructed with.
    #[must_use]
    pub fn policy_id(&self) -> &PolicyId {
        &self.id
    }

    /// Compile and wire up the pipeline for this policy (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::AlreadyBuilt`] if already built, or
    /// [`RuntimeError::BuildFailure`] if the builder or controller
    /// construction fails; the instance remains `Unbuilt` in that case.
    pub async fn build(
        &self,
        builder: &dyn PolicyBuilder,
        controller_factory: &dyn ControllerFactory,
    ) -> Result<(), RuntimeError> {
        let mut state = self.state.lock().await;
        if *state == LifecycleState::Built {
            return Err(RuntimeError::AlreadyBuilt {
                policy_id: self.id.to_string(),
            });
        }

        let built = match self.try_build(builder, controller_factory).await {
            Ok(built) => built,
            Err(source) => {
                warn!(target: "secpol.runtime", policy_id = %self.id, error = %source, "policy build failed");
                return Err(RuntimeError::BuildFailure {
                    policy_id: self.id.to_string(),
                    source,
                });
            }
        };

        *self.built.lock().await = Some(built);
        *state = LifecycleState::Built;
        info!(target: "secpol.runtime", policy_id = %self.id, "policy built");
        Ok(())
    }

    async fn try_build(
        &self,
        builder: &dyn PolicyBuilder,
        controller_factory: &dyn ControllerFactory,
    ) -> anyhow::Result<BuiltState> {
        let expr = builder.build_policy(self.id.as_str()).await?;
        let controller = controller_factory.make_controller(expr)?;

        let mut output_sub = controller.subscribe_output();
        let output_latch = Arc::clone(&self.output_latch);
        let output_task = tokio::spawn(async move {
            while let Some(event) = output_sub.recv().await {
                output_latch.set(event.0).await;
            }
        });

        let mut trace_sub = controller.subscribe_traces();
        let trace_buffer = Arc::clone(&self.trace_buffer);
        let trace_task = tokio::spawn(async move {
            while let Some(line) = trace_sub.recv().await {
                for record in classify(&line) {
                    match record {
                        Classification::Condition { asset, payload } => {
                            trace_buffer.append_condition(asset, payload).await;
                        }
                        Classification::Verbose { asset, raw } => {
                            trace_buffer.append_verbose(asset, raw).await;
                        }
                    }
                }
            }
        });

        Ok(BuiltState {
            controller,
            output_task,
            trace_task,
        })
    }

    /// Submit an event to the built pipeline (§4.4, I5).
    ///
    /// Returns as soon as the event is accepted by the controller; it does
    /// not wait for the event to traverse the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotBuilt`] if called before [`Self::build`]
    /// succeeds.
    pub async fn ingest(&self, event: secpol_core::Event) -> Result<(), RuntimeError> {
        let state = self.state.lock().await;
        if *state != LifecycleState::Built {
            return Err(RuntimeError::NotBuilt {
                policy_id: self.id.to_string(),
            });
        }
        let built = self.built.lock().await;
        let controller = &built
            .as_ref()
            .expect("built state present whenever lifecycle state is Built")
            .controller;
        debug!(target: "secpol.runtime", policy_id = %self.id, "ingest");
        controller.ingest(Ok(event));
        Ok(())
    }

    /// Render the combined output+trace artifact for `mode` (§4.4).
    ///
    /// Always takes the output latch mutex before the trace buffer mutex,
    /// establishing the global lock order required by §5. After this
    /// returns, the condition history is empty (I3, P3).
    pub async fn render(&self, mode: DebugMode) -> (String, String) {
        let output = self.output_latch.get().await;
        let history = self.trace_buffer.drain_history().await;

        let trace = match mode {
            DebugMode::OutputOnly => secpol_core::Value::empty_object().into(),
            DebugMode::OutputAndTraces => render_compact_trace(&history),
            DebugMode::OutputAndTracesWithDetails => {
                render_detailed_trace(&history, &self.trace_buffer).await
            }
        };

        (output, pretty_print_trace(&trace))
    }
}
