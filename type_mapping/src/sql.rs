//! Semantic column types
//!
//! This module maps the type names used in table metadata to the
//! semantic types carried by column and expression nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column or computed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Integer,
    Float,
    #[default]
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
    Uuid,
    Json,
    Blob,
    /// Table-valued nodes (root, reference, reverse reference, association)
    Table,
}

impl SqlType {
    /// Map a type name from table metadata to a semantic type
    pub fn from_name(name: &str) -> SqlType {
        // Normalize for consistent matching
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "integer" | "int" | "bigint" | "smallint" | "tinyint" | "mediumint" | "i32"
            | "i64" => SqlType::Integer,
            "float" | "double" | "decimal" | "numeric" | "real" | "f32" | "f64" => SqlType::Float,
            "boolean" | "bool" | "bit" => SqlType::Boolean,
            "date" => SqlType::Date,
            "time" => SqlType::Time,
            "datetime" | "timestamp" => SqlType::DateTime,
            "uuid" => SqlType::Uuid,
            "json" => SqlType::Json,
            "blob" | "binary" | "varbinary" => SqlType::Blob,
            "table" | "reverse_reference" | "association" => SqlType::Table,
            _ => SqlType::Text, // varchar, char, text, enum and anything unknown
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Integer => "integer",
            SqlType::Float => "float",
            SqlType::Text => "text",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::DateTime => "datetime",
            SqlType::Uuid => "uuid",
            SqlType::Json => "json",
            SqlType::Blob => "blob",
            SqlType::Table => "table",
        };
        write!(f, "{}", name)
    }
}
