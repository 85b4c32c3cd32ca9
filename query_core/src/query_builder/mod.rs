//! Query builder
//!
//! Collects the fragments contributed by nodes, conditions and clauses and
//! renders them into one statement.

pub mod builder;
pub mod join;
pub mod sql_generation;


#[cfg(test)]
mod integration_tests;

pub use builder::QueryBuilder;
pub use join::JoinItem;
