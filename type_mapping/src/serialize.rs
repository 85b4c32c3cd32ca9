//! Serialization utilities
//!
//! This module converts JSON data and serializable structs into
//! `SqlValue`s so they can be bound as named parameters.

use crate::types::SqlValue;
use serde::Serialize;
use std::collections::HashMap;

/// Convert a JSON value into the closest `SqlValue`
pub fn json_to_sql_value(value: serde_json::Value) -> SqlValue {
    match value {
        serde_json::Value::Null => SqlValue::Null,
        serde_json::Value::Bool(b) => SqlValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                SqlValue::Float(f)
            } else {
                SqlValue::Text(n.to_string())
            }
        }
        serde_json::Value::String(s) => {
            // Try to parse as RFC3339 timestamp first
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                SqlValue::DateTime(dt.naive_utc())
            } else {
                SqlValue::Text(s)
            }
        }
        serde_json::Value::Array(items) => {
            SqlValue::List(items.into_iter().map(json_to_sql_value).collect())
        }
        // Nested objects are bound as their JSON text
        other @ serde_json::Value::Object(_) => SqlValue::Text(other.to_string()),
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(val: serde_json::Value) -> Self {
        json_to_sql_value(val)
    }
}

/// Flatten a serializable struct into a name → value map
///
/// Fails when the data cannot be serialized or is not a struct or map.
pub fn serialize_to_sql_values<T: Serialize>(
    data: &T,
) -> Result<HashMap<String, SqlValue>, serde_json::Error> {
    match serde_json::to_value(data)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, json_to_sql_value(value)))
            .collect()),
        other => Err(serde::ser::Error::custom(format!(
            "expected a struct or map of named values, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
