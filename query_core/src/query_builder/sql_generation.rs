//! Statement rendering

use crate::errors::QueryResult;
use crate::named::SqlText;
use crate::query_builder::QueryBuilder;

const INDENT: &str = "    ";

impl QueryBuilder<'_> {
    /// WHERE items combined with an implicit AND, `None` when nothing filters
    pub fn where_statement(&self) -> Option<SqlText> {
        let filtering: Vec<SqlText> = self
            .where_items
            .iter()
            .filter(|item| !is_tautology(item))
            .cloned()
            .collect();
        if filtering.is_empty() {
            return None;
        }
        Some(SqlText::join(filtering, " AND "))
    }

    /// Render the complete SELECT statement
    ///
    /// Named placeholders stay in the returned text until the statement is
    /// prepared with values.
    pub fn statement(&self) -> QueryResult<SqlText> {
        let db = self.database();
        let select_list = self
            .select
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(&format!(",\n{}", INDENT));
        let grouped = !self.group_by.is_empty();
        // Distinct and grouped rows are counted through a derived table
        let wrap_count = self.count_only && (self.distinct || grouped);

        let mut sql = SqlText::new();
        if self.count_only {
            sql.push_str("SELECT\n");
            sql.push_str(INDENT);
            sql.push_str("COUNT(*) AS q_row_count\n");
            if wrap_count {
                if self.distinct {
                    sql.push_str("FROM (SELECT DISTINCT\n");
                    sql.push_str(INDENT);
                    sql.push_str(&select_list);
                } else {
                    sql.push_str("FROM (SELECT\n");
                    sql.push_str(INDENT);
                    sql.push_str(&self.group_by.join(&format!(",\n{}", INDENT)));
                }
                sql.push_str("\n");
            }
        } else {
            sql.push_str(if self.distinct { "SELECT DISTINCT\n" } else { "SELECT\n" });
            if let Some(limit_info) = &self.limit_info {
                if let Some(prefix) = db.sql_limit_variable_prefix(limit_info)? {
                    sql.push_str(INDENT);
                    sql.push_str(&prefix);
                    sql.push_str("\n");
                }
            }
            sql.push_str(INDENT);
            sql.push_str(&select_list);
            sql.push_str("\n");
        }

        sql.push_str("FROM\n");
        sql.push_str(INDENT);
        sql.push_str(&self.from.join(&format!(",\n{}", INDENT)));
        for join in self.joins.values() {
            sql.push_str("\n");
            sql.push_str(INDENT);
            sql.append(join.clone());
        }

        if let Some(where_sql) = self.where_statement() {
            sql.push_str("\nWHERE\n");
            sql.push_str(INDENT);
            sql.append(where_sql);
        }

        if grouped {
            sql.push_str("\nGROUP BY\n");
            sql.push_str(INDENT);
            sql.push_str(&self.group_by.join(&format!(",\n{}", INDENT)));
        }

        if !self.having.is_empty() {
            let mut unique: Vec<SqlText> = Vec::new();
            for item in &self.having {
                if !unique.contains(item) {
                    unique.push(item.clone());
                }
            }
            sql.push_str("\nHAVING\n");
            sql.push_str(INDENT);
            sql.append(SqlText::join(unique, " AND "));
        }

        if !self.order_by.is_empty() && !self.count_only {
            sql.push_str("\nORDER BY\n");
            sql.push_str(INDENT);
            sql.append(SqlText::join(self.order_by.clone(), &format!(",\n{}", INDENT)));
        }

        if let Some(limit_info) = &self.limit_info {
            if let Some(suffix) = db.sql_limit_variable_suffix(limit_info)? {
                sql.push_str("\n");
                sql.push_str(&suffix);
            }
        }

        if wrap_count {
            sql.push_str("\n) AS q_count_table");
        }

        crate::debug_log!("Built statement for {}: {}", self.root_table_name(), sql);
        Ok(sql)
    }
}

fn is_tautology(item: &SqlText) -> bool {
    item.to_sql().map(|sql| sql.trim() == "1=1").unwrap_or(false)
}
