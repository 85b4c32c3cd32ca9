//! Convenience re-exports for building queries

pub use crate::clause::{
    Aggregate, AggregateFunction, Clause, Expand, ExpandAsArray, GroupBy, Having, Limit, OrderBy,
    OrderItem, Select, SortOrder,
};
pub use crate::condition::{Condition, InOperand};
pub use crate::database::{Database, StandardDialect};
pub use crate::errors::{QueryError, QueryResult};
pub use crate::named::{NamedValue, NamedValues, SqlText};
pub use crate::node::{Node, NodeType, TableInfo};
pub use crate::operand::Operand;
pub use crate::query::Query;
pub use crate::query_builder::QueryBuilder;

pub use type_mapping::{SqlType, SqlValue};
