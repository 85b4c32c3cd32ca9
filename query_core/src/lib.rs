//! Query core - node trees, conditions and clauses rendered into SQL
//!
//! A query starts at a root table node. Relations are walked by creating
//! child nodes, conditions and clauses are built from those nodes, and a
//! [`QueryBuilder`] collects joins, select items and filters before
//! rendering the statement through a [`Database`] dialect.

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

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod clause;
pub mod condition;
pub mod database;
pub mod errors;
pub mod named;
pub mod node;
pub mod operand;
pub mod prelude;
pub mod query;
pub mod query_builder;
pub mod validation;

pub use clause::{
    Aggregate, AggregateFunction, Clause, Expand, ExpandAsArray, GroupBy, Having, Limit, OrderBy,
    OrderItem, Select, SortOrder,
};
pub use condition::{Condition, ConditionGroup, InOperand, LogicalOperator, QueryOperator};
pub use database::{Database, StandardDialect};
pub use errors::{QueryError, QueryResult};
pub use named::{NamedValue, NamedValues, ParameterForm, SqlText};
pub use node::{Node, NodeType, TableInfo};
pub use operand::Operand;
pub use query::Query;
pub use query_builder::QueryBuilder;
pub use validation::{ValidatedIdentifier, ValidationError};
