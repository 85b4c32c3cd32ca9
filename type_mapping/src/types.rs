//! Runtime values
//!
//! This module defines the scalar values that conditions, functions and
//! named parameters hand to a database dialect for rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use crate::sql::SqlType;

/// A scalar (or list of scalars) destined for SQL text
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    List(Vec<SqlValue>), // rendered as (a,b,c)
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Semantic type of the value, `None` for NULL and lists
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            SqlValue::Null | SqlValue::List(_) => None,
            SqlValue::Bool(_) => Some(SqlType::Boolean),
            SqlValue::Int(_) => Some(SqlType::Integer),
            SqlValue::Float(_) => Some(SqlType::Float),
            SqlValue::Text(_) => Some(SqlType::Text),
            SqlValue::Date(_) => Some(SqlType::Date),
            SqlValue::Time(_) => Some(SqlType::Time),
            SqlValue::DateTime(_) => Some(SqlType::DateTime),
            SqlValue::Uuid(_) => Some(SqlType::Uuid),
        }
    }
}

impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(val: &String) -> Self {
        SqlValue::Text(val.clone())
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(val: $t) -> Self {
                    SqlValue::Int(val as i64)
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for SqlValue {
    fn from(val: f32) -> Self {
        SqlValue::Float(val as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Float(val)
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Bool(val)
    }
}

impl From<Uuid> for SqlValue {
    fn from(val: Uuid) -> Self {
        SqlValue::Uuid(val)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(val: NaiveDate) -> Self {
        SqlValue::Date(val)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(val: NaiveTime) -> Self {
        SqlValue::Time(val)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(val: NaiveDateTime) -> Self {
        SqlValue::DateTime(val)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(val: DateTime<Utc>) -> Self {
        SqlValue::DateTime(val.naive_utc())
    }
}

impl<T> From<Vec<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Vec<T>) -> Self {
        SqlValue::List(val.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}
