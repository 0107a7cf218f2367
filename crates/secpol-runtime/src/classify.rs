//! Trace Classifier (C1).
//!
//! Parses one free-form trace line emitted by a pipeline operator into zero,
//! one, or two [`Classification`] records. The condition pattern is a
//! specialization of the verbose pattern, so a condition-shaped line always
//! yields both records — see [`classify`].

use regex::Regex;
use std::sync::OnceLock;

/// `[<asset>] [condition]:<payload>` — `<asset>` is the longest run of
/// non-`]` characters after the first `[`; `<payload>` is the remainder.
fn condition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\[([^\]]+)\] \[condition\]:(.*)$").expect("valid regex"))
}

/// `[<asset>] <payload>` — a strict superset of the condition pattern.
fn verbose_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\[([^\]]+)\] (.*)$").expect("valid regex"))
}

/// One classification record produced by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A `[<asset>] [condition]:<payload>` line.
    Condition {
        /// The asset that emitted this line.
        asset: String,
        /// The payload after `[condition]:`.
        payload: String,
    },
    /// A `[<asset>] <payload>` line, recorded as the **raw** input line.
    Verbose {
        /// The asset that emitted this line.
        asset: String,
        /// The complete, unmodified trace line.
        raw: String,
    },
}

/// Classify a single trace line.
///
/// Both regexes are matched independently against `line`: a condition-shaped
/// line produces a `Condition` record *and* a `Verbose` record (in that
/// order), because the detailed debug view needs the raw line verbatim while
/// the compact view needs only the condition payload. A line matching
/// neither pattern yields an empty vector (silently dropped, per the
/// `MalformedTrace` entry in the error taxonomy).
#[must_use]
pub fn classify(line: &str) -> Vec<Classification> {
    let mut out = Vec::with_capacity(2);

    if let Some(caps) = condition_re().captures(line) {
        out.push(Classification::Condition {
            asset: caps[1].to_string(),
            payload: caps[2].to_string(),
        });
    }

    if let Some(caps) = verbose_re().captures(line) {
        out.push(Classification::Verbose {
            asset: caps[1].to_string(),
            raw: line.to_string(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_line_yields_both_records() {
        let recs = classify("[decoder/d/0] [condition]:matched");
        assert_eq!(
            recs,
            vec![
                Classification::Condition {
                    asset: "decoder/d/0".to_string(),
                    payload: "matched".to_string(),
                },
                Classification::Verbose {
                    asset: "decoder/d/0".to_string(),
                    raw: "[decoder/d/0] [condition]:matched".to_string(),
                },
            ]
        );
    }

    #[test]
    fn plain_verbose_line_yields_only_verbose() {
        let recs = classify("[f/x/0] hit");
        assert_eq!(
            recs,
            vec![Classification::Verbose {
                asset: "f/x/0".to_string(),
                raw: "[f/x/0] hit".to_string(),
            }]
        );
    }

    #[test]
    fn malformed_lines_are_dropped() {
        assert!(classify("not a trace").is_empty());
        assert!(classify("[broken").is_empty());
    }

    #[test]
    fn embedded_newline_is_preserved_in_the_raw_verbose_record() {
        let line = "[f/x/0] [condition]:first\nsecond";
        let recs = classify(line);
        assert_eq!(
            recs,
            vec![
                Classification::Condition {
                    asset: "f/x/0".to_string(),
                    payload: "first\nsecond".to_string(),
                },
                Classification::Verbose {
                    asset: "f/x/0".to_string(),
                    raw: line.to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_payload_after_condition_colon_is_kept() {
        let recs = classify("[a/b/0] [condition]:");
        assert_eq!(
            recs,
            vec![
                Classification::Condition {
                    asset: "a/b/0".to_string(),
                    payload: String::new(),
                },
                Classification::Verbose {
                    asset: "a/b/0".to_string(),
                    raw: "[a/b/0] [condition]:".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_payload_after_verbose_space_is_kept() {
        let recs = classify("[a/b/0] ");
        assert_eq!(
            recs,
            vec![Classification::Verbose {
                asset: "a/b/0".to_string(),
                raw: "[a/b/0] ".to_string(),
            }]
        );
    }

    #[test]
    fn asset_is_longest_run_of_non_bracket_chars() {
        let recs = classify("[policy/x/0] [condition]:payload with ] inside");
        match &recs[0] {
            Classification::Condition { asset, payload } => {
                assert_eq!(asset, "policy/x/0");
                assert_eq!(payload, "payload with ] inside");
            }
            other => panic!("expected condition, got {other:?}"),
        }
    }

    #[test]
    fn condition_substring_elsewhere_does_not_confuse_verbose_payload() {
        // The dual-regex design means we never re-derive the condition
        // payload by re-splitting the verbose payload, so an operator that
        // legitimately emits "[condition]:" text deep in its message is not
        // double counted or misparsed.
        let recs = classify("[f/x/0] saw literal [condition]:nested text");
        assert_eq!(recs.len(), 1);
        assert!(matches!(&recs[0], Classification::Verbose { raw, .. } if raw.contains("[condition]:nested text")));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn condition_lines_round_trip(
            asset in "[a-zA-Z0-9_/\\-]{1,40}",
            payload in ".{0,80}",
        ) {
            let line = format!("[{asset}] [condition]:{payload}");
            let recs = classify(&line);
            prop_assert_eq!(recs.len(), 2);
            prop_assert_eq!(
                &recs[0],
                &Classification::Condition { asset: asset.clone(), payload: payload.clone() }
            );
            prop_assert_eq!(
                &recs[1],
                &Classification::Verbose { asset, raw: line }
            );
        }
    }
}
