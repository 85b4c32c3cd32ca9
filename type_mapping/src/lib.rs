//! Unified value and type model shared by the querytree crates.
//! Scalars bound into SQL and the semantic column types carried by nodes both live here.

pub mod serialize;
pub mod sql;
pub mod types;

pub use serialize::{json_to_sql_value, serialize_to_sql_values};
pub use sql::SqlType;
pub use types::SqlValue;
