//! Output Latch (C3).
//!
//! A single-slot, last-writer-wins holder of the most recently observed
//! terminal event's pretty-printed string form. Guarded by its own mutex,
//! distinct from the [`TraceBuffer`](crate::buffer::TraceBuffer)'s, so a
//! burst of trace lines never contends with output updates.

use tokio::sync::Mutex;

/// Holds the most recent terminal output string.
pub struct OutputLatch {
    slot: Mutex<String>,
}

impl OutputLatch {
    /// Create a latch with an empty initial slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(String::new()),
        }
    }

    /// Overwrite the slot with a new value.
    pub async fn set(&self, value: String) {
        let mut slot = self.slot.lock().await;
        *slot = value;
    }

    /// Copy out the current value.
    pub async fn get(&self) -> String {
        self.slot.lock().await.clone()
    }
}

impl Default for OutputLatch {
    fn default() -> Self {
        Self::new()
    }
}
