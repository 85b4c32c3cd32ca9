//! # querytree
//!
//! Compose queries as trees of table, relation and column nodes, filter
//! them with conditions, shape them with clauses, and render the result
//! into SQL for MySQL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use querytree::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let registry = DatabaseRegistry::init(&config).await?;
//!     let db = registry.get("main")?;
//!
//!     let person = Node::table(
//!         TableInfo::new("person", "id")
//!             .with_column("first_name", SqlType::Text)
//!             .with_column("last_name", SqlType::Text),
//!     )?;
//!     let query = Query::new(&person)
//!         .with_condition(Condition::equal(&person.column("last_name")?, NamedValue::new("name"))?)
//!         .with_clause(OrderBy::new(vec![OrderItem::from(person.column("first_name")?)])?)
//!         .with_clause(Limit::max(20));
//!
//!     let rows = db.select(&query, &NamedValues::new().with("name", "Smith")).await?;
//!     println!("Fetched {} rows", rows.len());
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::DatabaseRegistry;
pub use errors::QueryTreeError;

// Re-export centralized config
pub use config::{AdapterKind, AppConfig, DatabaseConfig};

// Re-export member crates
pub use mysql_adapter;
pub use query_core;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
