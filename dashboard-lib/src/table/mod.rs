//! Column-driven table projection.
//!
//! A [`TableView`] turns rows plus column and action descriptors into a
//! [`RenderedTable`]. It holds no state of its own: rendering the same inputs
//! twice yields equal output, and the only side effects are the callbacks
//! supplied by the caller.

mod action;
mod column;
mod text;
mod view;

pub use action::*;
pub use column::*;
pub use text::*;
pub use view::*;

use serde_json::Map;
use serde_json::Value;

/// Shown in place of absent values.
pub const PLACEHOLDER: &str = "N/A";

/// One record displayed by a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wraps a JSON object; other values yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Extracts rows from a list payload.
///
/// Accepts `{ "<items_key>": [...] }` or a bare array; anything else yields
/// no rows. Non-object elements are skipped.
pub fn rows_from_payload(payload: &Value, items_key: &str) -> Vec<Row> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(fields) => match fields.get(items_key) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().cloned().filter_map(Row::from_value).collect()
}

/// Reads the total row count reported by a list payload.
///
/// Falls back to the number of rows in the payload when the total is
/// missing, zero or not a number.
pub fn total_from_payload(payload: &Value, total_key: &str, items_key: &str) -> u64 {
    payload
        .get(total_key)
        .and_then(Value::as_u64)
        .filter(|total| *total > 0)
        .unwrap_or_else(|| rows_from_payload(payload, items_key).len() as u64)
}
