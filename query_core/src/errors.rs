//! Error types for query construction and rendering
//!
//! Caller and invalid-cast errors carry a blame offset: every layer that
//! forwards one bumps the offset so the report points at the code that
//! actually misused the API.

use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The API was used incorrectly (wrong node kind, missing parent, ...)
    #[error("Caller error: {message}")]
    Caller { message: String, offset: u32 },

    /// An operand could not be used as the required kind of value or node
    #[error("Invalid cast: {message}")]
    InvalidCast { message: String, offset: u32 },

    #[error("Unresolved named parameter: {0}")]
    UnboundParameter(String),

    #[error("Database adapter error: {0}")]
    Adapter(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl QueryError {
    pub fn caller(message: impl Into<String>) -> Self {
        QueryError::Caller {
            message: message.into(),
            offset: 1,
        }
    }

    pub fn invalid_cast(message: impl Into<String>) -> Self {
        QueryError::InvalidCast {
            message: message.into(),
            offset: 1,
        }
    }

    pub fn adapter(message: impl Into<String>) -> Self {
        QueryError::Adapter(message.into())
    }

    /// Move the blame one layer further out
    pub fn increment_offset(self) -> Self {
        match self {
            QueryError::Caller { message, offset } => QueryError::Caller {
                message,
                offset: offset + 1,
            },
            QueryError::InvalidCast { message, offset } => QueryError::InvalidCast {
                message,
                offset: offset + 1,
            },
            other => other,
        }
    }

    /// Blame depth for caller and invalid-cast errors
    pub fn offset(&self) -> Option<u32> {
        match self {
            QueryError::Caller { offset, .. } | QueryError::InvalidCast { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }

    pub fn is_caller(&self) -> bool {
        matches!(self, QueryError::Caller { .. })
    }

    pub fn is_invalid_cast(&self) -> bool {
        matches!(self, QueryError::InvalidCast { .. })
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_offset() {
        let err = QueryError::caller("bad node").increment_offset().increment_offset();
        assert_eq!(err.offset(), Some(3));
        assert!(err.is_caller());
        assert_eq!(err.to_string(), "Caller error: bad node");
    }

    #[test]
    fn test_offset_untouched_for_adapter_errors() {
        let err = QueryError::adapter("Invalid Semicolon in LIMIT Info").increment_offset();
        assert_eq!(err.offset(), None);
        assert_eq!(err, QueryError::Adapter("Invalid Semicolon in LIMIT Info".to_string()));
    }
}
