//! MySQL flavour of the SQL dialect

use query_core::database::guard_fragment;
use query_core::{Database, QueryResult};

/// Backtick identifiers, backslash string escapes, `LIMIT offset,max`
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Database for MySqlDialect {
    fn escape_identifier_begin(&self) -> &str {
        "`"
    }

    fn escape_identifier_end(&self) -> &str {
        "`"
    }

    fn escape_string(&self, value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 8);
        for c in value.chars() {
            match c {
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '"' => escaped.push_str("\\\""),
                '\x1a' => escaped.push_str("\\Z"),
                other => escaped.push(other),
            }
        }
        escaped
    }

    fn sql_limit_variable_suffix(&self, limit_info: &str) -> QueryResult<Option<String>> {
        let limit_info = limit_info.trim();
        if limit_info.is_empty() {
            return Ok(None);
        }
        guard_fragment(limit_info, "LIMIT", "`")?;
        Ok(Some(format!("LIMIT {}", limit_info)))
    }

    fn sql_sort_by_variable(&self, sort_by_info: &str) -> QueryResult<Option<String>> {
        let sort_by_info = sort_by_info.trim();
        if sort_by_info.is_empty() {
            return Ok(None);
        }
        guard_fragment(sort_by_info, "ORDER BY", "`")?;
        Ok(Some(format!("ORDER BY {}", sort_by_info)))
    }
}
