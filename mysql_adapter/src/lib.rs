//! MySQL adapter for query-core
//!
//! [`MySqlDialect`] renders statements with MySQL quoting rules and
//! [`MySqlDatabase`] runs them over an sqlx connection pool.

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

pub mod database;
pub mod dialect;
pub mod errors;

pub use database::{MySqlDatabase, ProfileEntry};
pub use dialect::MySqlDialect;
pub use errors::{AdapterError, AdapterResult};
