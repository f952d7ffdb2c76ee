//! Typed free-form values carried by attribute documents and telemetry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::RESERVED_KEYS;
use crate::error::ValidationError;

/// A single typed value.
///
/// Untagged, so a JSON number becomes [`AttributeValue::Int`] when it fits an
/// `i64` and [`AttributeValue::Float`] otherwise. Integers outside the `i64`
/// range therefore keep only the 53-bit precision of an `f64`: `2^63 + 1`
/// reads back as `2^63`. Send such values as strings to keep them exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Ordered key-value map; ordering keeps serialized views stable.
pub type ValueMap = BTreeMap<String, AttributeValue>;

/// Reject maps that use a key owned by the merged sensor view.
///
/// # Errors
///
/// Returns [`ValidationError::ReservedKey`] for the first reserved key found.
pub fn ensure_no_reserved_keys(map: &ValueMap) -> Result<(), ValidationError> {
    match RESERVED_KEYS.iter().find(|key| map.contains_key(**key)) {
        Some(key) => Err(ValidationError::ReservedKey((*key).to_owned())),
        None => Ok(()),
    }
}
