//! The structured document carried by an [`Event`].
//!
//! A [`Value`] is a tree of the usual JSON-ish primitives. The engine never
//! interprets the tree itself — it only needs to hand it to a
//! [`PipelineController`](crate::Event) and, on egress, pretty-print it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A structured document: null, bool, int, double, string, array, or object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered array of values.
    Array(Vec<Value>),
    /// Object with string keys, in lexicographic (sorted) key order.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Convenience constructor for an empty object.
    #[must_use]
    pub fn empty_object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Render this value as pretty-printed JSON, matching the original's
    /// `payload.prettyStr()` contract: two-space indent, trailing newline.
    #[must_use]
    pub fn pretty_str(&self) -> String {
        let as_json: serde_json::Value = self.into();
        let mut rendered =
            serde_json::to_string_pretty(&as_json).unwrap_or_else(|_| "null".to_string());
        rendered.push('\n');
        rendered
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_str())
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Double(d) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Into::into).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        (&value).into()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_str_matches_serde_json_pretty_plus_newline() {
        let value = Value::Object(BTreeMap::from([("a".to_string(), Value::Int(1))]));
        assert_eq!(value.pretty_str(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn round_trips_through_serde_json_value() {
        let original = serde_json::json!({"a": 1, "b": [true, null, "x"]});
        let value: Value = original.clone().into();
        let back: serde_json::Value = value.into();
        assert_eq!(original, back);
    }

    use proptest::prelude::*;

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::Bool),
            any::<i32>().prop_map(|i| serde_json::Value::Number(i.into())),
            ".*".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(3, 16, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                prop::collection::btree_map(".{0,8}", inner, 0..4)
                    .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn arbitrary_json_round_trips_through_value(json in arb_json()) {
            let value: Value = json.clone().into();
            let back: serde_json::Value = value.into();
            prop_assert_eq!(json, back);
        }
    }
}
