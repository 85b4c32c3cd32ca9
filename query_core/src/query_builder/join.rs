//! LEFT JOIN items

use crate::database::Database;

/// One table joined onto its parent
///
/// `alias_key` and `parent_alias_key` are full node aliases; the builder
/// maps them to short table aliases when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinItem {
    pub table: String,
    pub alias_key: String,
    pub parent_alias_key: String,
    /// Column on the parent side of the ON clause
    pub parent_column: String,
    /// Column on the joined table
    pub column: String,
}

impl JoinItem {
    /// `LEFT JOIN table AS tN ON tP.parent_column = tN.column`
    pub fn to_sql(&self, db: &dyn Database, table_alias: &str, parent_alias: &str) -> String {
        format!(
            "LEFT JOIN {} AS {} ON {}.{} = {}.{}",
            db.escape_identifier(&self.table),
            db.escape_identifier(table_alias),
            db.escape_identifier(parent_alias),
            db.escape_identifier(&self.parent_column),
            db.escape_identifier(table_alias),
            db.escape_identifier(&self.column)
        )
    }
}
