//! Trace Buffer (C2).
//!
//! Per-asset ordered store of verbose lines, plus an ordered list of
//! condition records, behind a single [`tokio::sync::Mutex`]. Deduplication
//! of verbose lines happens on read ([`TraceBuffer::take_verbose`]), not on
//! write: operators may legitimately fire repeatedly for one event, and the
//! compact view wants every firing while the detailed view wants every
//! *distinct* trace text.

use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

/// One condition record: the asset that emitted it and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRecord {
    /// Asset name.
    pub asset: String,
    /// Condition payload.
    pub payload: String,
}

#[derive(Default)]
struct State {
    history: Vec<ConditionRecord>,
    verbose: HashMap<String, Vec<String>>,
}

/// Per-asset trace storage shared between the trace sink and `render`.
pub struct TraceBuffer {
    state: Mutex<State>,
    max_verbose_per_asset: Option<usize>,
}

impl TraceBuffer {
    /// Create an empty trace buffer.
    ///
    /// `max_verbose_per_asset`, if set, bounds the number of raw lines
    /// retained per asset (oldest dropped first) as an added safeguard
    /// against unbounded memory growth; `None` preserves the original's
    /// unbounded behavior.
    #[must_use]
    pub fn new(max_verbose_per_asset: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            max_verbose_per_asset,
        }
    }

    /// Append a condition record. No deduplication: duplicate firings for
    /// the same asset/payload are preserved in arrival order (I1).
    pub async fn append_condition(&self, asset: String, payload: String) {
        let mut state = self.state.lock().await;
        state.history.push(ConditionRecord { asset, payload });
    }

    /// Append a raw verbose line for `asset` (I2). If a retention cap is
    /// configured and exceeded, the oldest line for that asset is dropped.
    pub async fn append_verbose(&self, asset: String, raw: String) {
        let mut state = self.state.lock().await;
        let lines = state.verbose.entry(asset).or_default();
        lines.push(raw);
        if let Some(cap) = self.max_verbose_per_asset {
            while lines.len() > cap {
                lines.remove(0);
            }
        }
    }

    /// Return the current condition history and empty it atomically (I3).
    pub async fn drain_history(&self) -> Vec<ConditionRecord> {
        let mut state = self.state.lock().await;
        std::mem::take(&mut state.history)
    }

    /// Return the unique raw lines buffered for `asset`, in lexicographic
    /// order (deterministic for tests), and clear that asset's bucket.
    /// Returns an empty set if the asset has no buffered lines.
    pub async fn take_verbose(&self, asset: &str) -> BTreeSet<String> {
        let mut state = self.state.lock().await;
        match state.verbose.remove(asset) {
            Some(lines) => lines.into_iter().collect(),
            None => BTreeSet::new(),
        }
    }
}
