//! Named values and deferred binding
//!
//! Conditions can reference values that are only known when the statement
//! is executed. Instead of embedding marker bytes in the SQL string, the
//! rendered SQL is kept as a list of segments where each placeholder is a
//! typed `Segment::Named`. `Database::prepare_statement` later replaces
//! them with escaped literals, so one rendered statement can be bound many
//! times with different values.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use type_mapping::{serialize_to_sql_values, SqlValue};

use crate::errors::{QueryError, QueryResult};

/// How a placeholder is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterForm {
    /// The bare value (lists expand to `a,b,c`)
    Plain,
    /// `= value`, or `IS NULL` when the value is null
    Equal,
    /// `!= value`, or `IS NOT NULL` when the value is null
    NotEqual,
}

/// A reference to a value bound at execution time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedValue {
    name: String,
}

impl NamedValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The placeholder for this value in the given form
    pub fn parameter(&self, form: ParameterForm) -> SqlText {
        let mut text = SqlText::new();
        text.push_named(&self.name, form);
        text
    }
}

/// One piece of rendered SQL
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Sql(String),
    Named { name: String, form: ParameterForm },
    /// `column [NOT] IN (...)` over a bound list; an empty list binds to a
    /// constant condition instead
    InList {
        column: String,
        name: String,
        negated: bool,
    },
}

/// SQL text that may still contain named placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlText {
    segments: Vec<Segment>,
}

impl SqlText {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Literal SQL without placeholders
    pub fn sql(text: impl Into<String>) -> Self {
        let mut sql = Self::new();
        sql.push_str(&text.into());
        sql
    }

    pub fn push_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Sql(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Sql(text.to_string()));
        }
    }

    pub fn push_named(&mut self, name: &str, form: ParameterForm) {
        self.segments.push(Segment::Named {
            name: name.to_string(),
            form,
        });
    }

    pub fn push_in_list(&mut self, column: &str, name: &str, negated: bool) {
        self.segments.push(Segment::InList {
            column: column.to_string(),
            name: name.to_string(),
            negated,
        });
    }

    pub fn append(&mut self, other: SqlText) {
        for segment in other.segments {
            match segment {
                Segment::Sql(text) => self.push_str(&text),
                named => self.segments.push(named),
            }
        }
    }

    /// Concatenate parts with a literal separator
    pub fn join<I>(parts: I, separator: &str) -> SqlText
    where
        I: IntoIterator<Item = SqlText>,
    {
        let mut joined = SqlText::new();
        for (index, part) in parts.into_iter().enumerate() {
            if index > 0 {
                joined.push_str(separator);
            }
            joined.append(part);
        }
        joined
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, Segment::Sql(_)))
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholder_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Named { name, .. } | Segment::InList { name, .. } => Some(name.as_str()),
                Segment::Sql(_) => None,
            })
            .collect()
    }

    /// The text when no placeholders remain
    pub fn to_sql(&self) -> QueryResult<String> {
        let mut sql = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Sql(text) => sql.push_str(text),
                Segment::Named { name, .. } | Segment::InList { name, .. } => {
                    return Err(QueryError::UnboundParameter(name.clone()));
                }
            }
        }
        Ok(sql)
    }
}

impl fmt::Display for SqlText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Sql(text) => write!(f, "{}", text)?,
                Segment::Named { name, form } => match form {
                    ParameterForm::Plain => write!(f, "{{{}}}", name)?,
                    ParameterForm::Equal => write!(f, "{{={}=}}", name)?,
                    ParameterForm::NotEqual => write!(f, "{{!{}!}}", name)?,
                },
                Segment::InList {
                    column,
                    name,
                    negated,
                } => write!(
                    f,
                    "{} {}IN ({{{}}})",
                    column,
                    if *negated { "NOT " } else { "" },
                    name
                )?,
            }
        }
        Ok(())
    }
}

impl From<String> for SqlText {
    fn from(text: String) -> Self {
        SqlText::sql(text)
    }
}

impl From<&str> for SqlText {
    fn from(text: &str) -> Self {
        SqlText::sql(text)
    }
}

/// Values for the placeholders of a statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedValues {
    values: HashMap<String, SqlValue>,
}

impl NamedValues {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Bind every field of a serializable struct by its field name
    pub fn from_serialize<T: Serialize>(data: &T) -> QueryResult<Self> {
        let values = serialize_to_sql_values(data).map_err(|e| {
            QueryError::invalid_cast(format!("Cannot bind named values: {}", e))
        })?;
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
