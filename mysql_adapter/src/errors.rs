use query_core::QueryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
