//! Render Formatter (C5).
//!
//! Pure, stateless: combines the output string and the drained/collected
//! trace records into the `(output, trace-json)` pair `render` returns.

use crate::buffer::{ConditionRecord, TraceBuffer};
use serde_json::{Map, Value as Json};

/// Caller-chosen verbosity selector for `render`.
///
/// The discriminant values are wire-stable for any embedding API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DebugMode {
    /// Output only; the trace object stays empty.
    OutputOnly = 0,
    /// Output plus the last condition payload per asset.
    OutputAndTraces = 1,
    /// Output plus every distinct verbose line per asset, concatenated.
    OutputAndTracesWithDetails = 2,
}

/// Escape an asset name per RFC 6901 so it can be inserted as a single JSON
/// Pointer path segment: `~` → `~0`, then `/` → `~1`.
///
/// This resolves the Open Question in spec.md §9/§4.5: upstream asset names
/// follow `<type>/<name>/<version>`, and without escaping the embedded `/`
/// characters would be read back as nested pointer segments. Escaping keeps
/// the rendered key a single, unambiguous top-level field.
#[must_use]
pub fn escape_asset_segment(asset: &str) -> String {
    asset.replace('~', "~0").replace('/', "~1")
}

/// Build the compact (`OUTPUT_AND_TRACES`) trace object from drained
/// condition history: `trace["/" + escape(asset)] = payload`, later writes
/// for the same asset overwriting earlier ones within this render.
#[must_use]
pub fn render_compact_trace(history: &[ConditionRecord]) -> Json {
    let mut fields = Map::new();
    for record in history {
        let key = format!("/{}", escape_asset_segment(&record.asset));
        fields.insert(key, Json::String(record.payload.clone()));
    }
    Json::Object(fields)
}

/// Build the detailed (`OUTPUT_AND_TRACES_WITH_DETAILS`) trace object.
///
/// For each asset that appeared in the condition history (in drain order,
/// de-duplicated), calls [`TraceBuffer::take_verbose`] and concatenates the
/// unique raw lines in their (lexicographic, from the underlying
/// `BTreeSet`) iteration order.
#[must_use]
pub async fn render_detailed_trace(history: &[ConditionRecord], buffer: &TraceBuffer) -> Json {
    let mut fields = Map::new();
    let mut seen_assets = Vec::new();
    for record in history {
        if !seen_assets.contains(&record.asset) {
            seen_assets.push(record.asset.clone());
        }
    }
    for asset in seen_assets {
        let lines = buffer.take_verbose(&asset).await;
        let concatenated = lines.into_iter().collect::<Vec<_>>().join("");
        let key = format!("/{}", escape_asset_segment(&asset));
        fields.insert(key, Json::String(concatenated));
    }
    Json::Object(fields)
}

/// Pretty-print a trace JSON object, matching the original's
/// pretty-printed-JSON contract for the second element of `render`'s result.
#[must_use]
pub fn pretty_print_trace(trace: &Json) -> String {
    serde_json::to_string_pretty(trace).unwrap_or_else(|_| "{}".to_string())
}
