//! Error types for the querytree crate
//!
//! This module contains all error types that can be returned by registry operations.

use mysql_adapter::AdapterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryTreeError {
    #[error("Database adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Database already registered: {0}")]
    DatabaseAlreadyRegistered(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
