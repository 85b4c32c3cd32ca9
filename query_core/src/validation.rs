//! Validation module
//!
//! Node names, aliases and table names end up inside escaped identifiers,
//! so they are checked once when a node is built or renamed.

use std::fmt;

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains invalid characters (only alphanumeric, `_` and `$` allowed)
    InvalidCharacters(String),
    /// Name is too long (MySQL limit is 64 characters)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(f, "Invalid characters in name '{}': only alphanumeric characters, underscores and dollar signs are allowed", name)
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated identifier (table, column or alias name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedIdentifier(String);

impl ValidatedIdentifier {
    /// MySQL identifier length limit
    const MAX_LENGTH: usize = 64;

    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::validate(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn validate(name: &str) -> Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.len(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for ValidatedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ValidatedIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(ValidatedIdentifier::new("person").is_ok());
        assert!(ValidatedIdentifier::new("team_member_project_assn").is_ok());
        assert!(ValidatedIdentifier::new("_tmp$1").is_ok());
        // Keywords are fine, identifiers are always escaped
        assert!(ValidatedIdentifier::new("order").is_ok());
        assert!(ValidatedIdentifier::new("1st_quarter").is_ok());
    }

    #[test]
    fn test_empty_identifier() {
        assert_eq!(ValidatedIdentifier::new(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_too_long_identifier() {
        let name = "a".repeat(65);
        match ValidatedIdentifier::new(&name) {
            Err(ValidationError::TooLong {
                length, max_length, ..
            }) => {
                assert_eq!(length, 65);
                assert_eq!(max_length, 64);
            }
            other => panic!("Expected TooLong error, got {:?}", other),
        }
        assert!(ValidatedIdentifier::new(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_injection_characters_rejected() {
        for name in ["person`; DROP", "a.b", "a b", "a\"b", "na;me", "x--"] {
            assert!(matches!(
                ValidatedIdentifier::new(name),
                Err(ValidationError::InvalidCharacters(_))
            ));
        }
    }
}
