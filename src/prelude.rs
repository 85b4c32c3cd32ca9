//! Convenience re-exports for common querytree usage
//!
//! # Example
//!
//! ```rust
//! use querytree::prelude::*;
//!
//! let person = Node::table(TableInfo::new("person", "id")).unwrap();
//! let sql = Query::new(&person).build(&MySqlDialect::new()).unwrap().to_string();
//! assert!(sql.starts_with("SELECT"));
//! ```

// Core components
pub use crate::core::DatabaseRegistry;
pub use crate::errors::QueryTreeError;

// Re-export centralized config
pub use config::{AdapterKind, AppConfig, DatabaseConfig};

// Nodes, conditions, clauses and rendering
pub use query_core::prelude::*;

// MySQL adapter
pub use mysql_adapter::{AdapterError, MySqlDatabase, MySqlDialect, ProfileEntry};

// Common external dependencies
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::Row;
pub use sqlx::mysql::{MySqlPool, MySqlRow};
pub use uuid::Uuid;
pub use chrono::{NaiveDate, NaiveDateTime};
