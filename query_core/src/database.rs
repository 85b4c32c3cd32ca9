//! Database dialect contract
//!
//! Nodes, conditions and clauses never format identifiers or literals
//! themselves; everything dialect specific goes through `Database`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use type_mapping::SqlValue;

use crate::errors::{QueryError, QueryResult};
use crate::named::{NamedValues, ParameterForm, Segment, SqlText};

/// Formatting services a query builder needs from a database adapter
pub trait Database {
    /// Opening identifier quote
    fn escape_identifier_begin(&self) -> &str {
        "\""
    }

    /// Closing identifier quote
    fn escape_identifier_end(&self) -> &str {
        "\""
    }

    /// Quote an identifier, doubling any embedded closing quote
    fn escape_identifier(&self, name: &str) -> String {
        let end = self.escape_identifier_end();
        format!(
            "{}{}{}",
            self.escape_identifier_begin(),
            name.replace(end, &format!("{}{}", end, end)),
            end
        )
    }

    /// Escape the contents of a string literal (without the quotes)
    fn escape_string(&self, value: &str) -> String;

    /// Render a value as an SQL literal, optionally with its comparison operator
    ///
    /// With `include_equality` the result is a complete right-hand side:
    /// `= 5`, `!= 'x'`, and for null `IS NULL` / `IS NOT NULL`, so that
    /// "equal to null" never renders as `= NULL`.
    fn sql_variable(
        &self,
        value: &SqlValue,
        include_equality: bool,
        reverse_equality: bool,
    ) -> String {
        let operator = match (include_equality, reverse_equality) {
            (false, _) => "",
            (true, false) => "= ",
            (true, true) => "!= ",
        };

        match value {
            SqlValue::Bool(flag) => bool_literal(*flag, include_equality, reverse_equality),
            SqlValue::Null => null_literal(include_equality, reverse_equality),
            SqlValue::Float(f) if !f.is_finite() => {
                null_literal(include_equality, reverse_equality)
            }
            SqlValue::Int(i) => format!("{}{}", operator, i),
            SqlValue::Float(f) => format!("{}{}", operator, f),
            SqlValue::Date(date) => format!("{}'{}'", operator, format_date(date)),
            SqlValue::Time(time) => format!("{}'{}'", operator, format_time(time)),
            SqlValue::DateTime(datetime) => {
                format!("{}'{}'", operator, format_datetime(datetime))
            }
            SqlValue::Uuid(uuid) => format!("{}'{}'", operator, uuid.hyphenated()),
            SqlValue::Text(text) => format!("{}'{}'", operator, self.escape_string(text)),
            // Lists are only meaningful as IN operands, the operator is dropped
            SqlValue::List(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| self.sql_variable(item, false, false))
                    .collect();
                format!("({})", rendered.join(","))
            }
        }
    }

    /// Fragment placed right after SELECT for dialects that limit there
    fn sql_limit_variable_prefix(&self, _limit_info: &str) -> QueryResult<Option<String>> {
        Ok(None)
    }

    /// Fragment appended to the statement to apply `offset,max` limit info
    fn sql_limit_variable_suffix(&self, limit_info: &str) -> QueryResult<Option<String>>;

    /// `ORDER BY` fragment for caller-supplied sort text
    fn sql_sort_by_variable(&self, sort_by_info: &str) -> QueryResult<Option<String>>;

    /// Replace named placeholders with escaped literals
    fn prepare_statement(&self, statement: &SqlText, values: &NamedValues) -> QueryResult<String> {
        let mut sql = String::new();

        for segment in statement.segments() {
            match segment {
                Segment::Sql(text) => sql.push_str(text),
                Segment::Named { name, form } => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| QueryError::UnboundParameter(name.clone()))?;

                    let rendered = match (value, form) {
                        (SqlValue::List(items), ParameterForm::Plain) => {
                            if items.is_empty() {
                                "NULL".to_string()
                            } else {
                                plain_list(self, items)
                            }
                        }
                        (SqlValue::List(_), _) => {
                            return Err(QueryError::caller(format!(
                                "Named value '{}' is a list and cannot be used in an equality comparison",
                                name
                            )));
                        }
                        (value, ParameterForm::Plain) => self.sql_variable(value, false, false),
                        (value, ParameterForm::Equal) => self.sql_variable(value, true, false),
                        (value, ParameterForm::NotEqual) => self.sql_variable(value, true, true),
                    };
                    sql.push_str(&rendered);
                }
                Segment::InList {
                    column,
                    name,
                    negated,
                } => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| QueryError::UnboundParameter(name.clone()))?;
                    let keyword = if *negated { "NOT IN" } else { "IN" };
                    match value {
                        // Nothing is in the empty set
                        SqlValue::List(items) if items.is_empty() => {
                            sql.push_str(if *negated { "1=1" } else { "1=0" })
                        }
                        SqlValue::List(items) => sql.push_str(&format!(
                            "{} {} ({})",
                            column,
                            keyword,
                            plain_list(self, items)
                        )),
                        scalar => sql.push_str(&format!(
                            "{} {} ({})",
                            column,
                            keyword,
                            self.sql_variable(scalar, false, false)
                        )),
                    }
                }
            }
        }

        debug_log!("prepared statement with {} named values", values.len());
        Ok(sql)
    }
}

fn plain_list<D: Database + ?Sized>(db: &D, items: &[SqlValue]) -> String {
    items
        .iter()
        .map(|item| db.sql_variable(item, false, false))
        .collect::<Vec<_>>()
        .join(",")
}

/// Booleans compare against zero so that any non-zero value counts as true
fn bool_literal(flag: bool, include_equality: bool, reverse_equality: bool) -> String {
    let literal = match (include_equality, reverse_equality, flag) {
        (true, false, true) | (true, true, false) => "!= 0",
        (true, false, false) | (true, true, true) => "= 0",
        (false, _, true) => "1",
        (false, _, false) => "0",
    };
    literal.to_string()
}

fn null_literal(include_equality: bool, reverse_equality: bool) -> String {
    match (include_equality, reverse_equality) {
        (false, _) => "NULL".to_string(),
        (true, false) => "IS NULL".to_string(),
        (true, true) => "IS NOT NULL".to_string(),
    }
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Reject limit / sort text that could smuggle in another statement
pub fn guard_fragment(info: &str, kind: &str, forbidden_quote: &str) -> QueryResult<()> {
    if info.contains(';') {
        return Err(QueryError::adapter(format!("Invalid Semicolon in {} Info", kind)));
    }
    if !forbidden_quote.is_empty() && info.contains(forbidden_quote) {
        return Err(QueryError::adapter(format!(
            "Invalid {} in {} Info",
            if forbidden_quote == "`" { "Backtick" } else { "Quote" },
            kind
        )));
    }
    Ok(())
}

/// ANSI flavoured dialect: double-quoted identifiers, `LIMIT n OFFSET m`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDialect;

impl StandardDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Database for StandardDialect {
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    fn sql_limit_variable_suffix(&self, limit_info: &str) -> QueryResult<Option<String>> {
        let limit_info = limit_info.trim();
        if limit_info.is_empty() {
            return Ok(None);
        }
        guard_fragment(limit_info, "LIMIT", self.escape_identifier_end())?;

        match limit_info.split_once(',') {
            Some((offset, max_rows)) => Ok(Some(format!(
                "LIMIT {} OFFSET {}",
                max_rows.trim(),
                offset.trim()
            ))),
            None => Ok(Some(format!("LIMIT {}", limit_info))),
        }
    }

    fn sql_sort_by_variable(&self, sort_by_info: &str) -> QueryResult<Option<String>> {
        if sort_by_info.is_empty() {
            return Ok(None);
        }
        guard_fragment(sort_by_info, "ORDER BY", self.escape_identifier_end())?;
        Ok(Some(format!("ORDER BY {}", sort_by_info)))
    }
}
