//! Query builder state
//!
//! Nodes, conditions and clauses push their fragments here; the builder
//! hands out short table and column aliases and renders the statement.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use crate::condition::Condition;
use crate::database::Database;
use crate::errors::{QueryError, QueryResult};
use crate::named::SqlText;
use crate::node::{Node, NodeType};
use crate::query_builder::join::JoinItem;

pub struct QueryBuilder<'a> {
    database: &'a dyn Database,
    root_table_name: String,
    pub(crate) select: IndexMap<String, String>,
    column_aliases: IndexMap<String, String>,
    table_aliases: IndexMap<String, String>,
    pub(crate) from: Vec<String>,
    pub(crate) joins: IndexMap<String, SqlText>,
    pub(crate) where_items: Vec<SqlText>,
    pub(crate) order_by: Vec<SqlText>,
    pub(crate) group_by: Vec<String>,
    pub(crate) having: Vec<SqlText>,
    virtual_nodes: HashMap<String, Node>,
    expand_as_array: IndexMap<String, Node>,
    pub(crate) limit_info: Option<String>,
    pub(crate) distinct: bool,
    pub(crate) count_only: bool,
    processed: HashSet<u64>,
}

impl<'a> QueryBuilder<'a> {
    /// Builder for a query against the table of `root`
    ///
    /// The root table always gets table alias `t0`.
    pub fn new(database: &'a dyn Database, root: &Node) -> QueryResult<Self> {
        if !root.is_root() {
            return Err(QueryError::caller(format!(
                "Queries must start at a root table node, got {:?} node \"{}\"",
                root.node_type(),
                root.name()
            )));
        }
        let root_table_name = root
            .table_name()?
            .ok_or_else(|| QueryError::caller("Root node has no table"))?;
        let mut builder = Self {
            database,
            root_table_name,
            select: IndexMap::new(),
            column_aliases: IndexMap::new(),
            table_aliases: IndexMap::new(),
            from: Vec::new(),
            joins: IndexMap::new(),
            where_items: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            virtual_nodes: HashMap::new(),
            expand_as_array: IndexMap::new(),
            limit_info: None,
            distinct: false,
            count_only: false,
            processed: HashSet::new(),
        };
        builder.table_alias(&root.full_alias()?);
        Ok(builder)
    }

    pub fn database(&self) -> &'a dyn Database {
        self.database
    }

    pub fn root_table_name(&self) -> &str {
        &self.root_table_name
    }

    /// Short alias (`t0`, `t1`, ...) for a table key, allocated on first use
    pub fn table_alias(&mut self, table_key: &str) -> String {
        if let Some(alias) = self.table_aliases.get(table_key) {
            return alias.clone();
        }
        let alias = format!("t{}", self.table_aliases.len());
        self.table_aliases
            .insert(table_key.to_string(), alias.clone());
        alias
    }

    /// Short alias (`a0`, `a1`, ...) for a selected column
    pub fn column_alias(&mut self, full_alias: &str) -> String {
        if let Some(alias) = self.column_aliases.get(full_alias) {
            return alias.clone();
        }
        let alias = format!("a{}", self.column_aliases.len());
        self.column_aliases
            .insert(full_alias.to_string(), alias.clone());
        alias
    }

    /// Full alias → column alias, in select order
    pub fn column_aliases(&self) -> &IndexMap<String, String> {
        &self.column_aliases
    }

    /// Table key → table alias, in join order
    pub fn table_aliases(&self) -> &IndexMap<String, String> {
        &self.table_aliases
    }

    pub fn add_select_item(&mut self, table_key: &str, column: &str, full_alias: &str) {
        let table_alias = self.table_alias(table_key);
        let column_alias = self.column_alias(full_alias);
        let db = self.database;
        let sql = format!(
            "{}.{} AS {}",
            db.escape_identifier(&table_alias),
            db.escape_identifier(column),
            db.escape_identifier(&column_alias)
        );
        crate::trace_log!("Select item {} for {}", sql, full_alias);
        self.select.insert(full_alias.to_string(), sql);
    }

    /// Computed select item, readable back as `__name`
    pub fn add_select_function(&mut self, function: Option<&str>, expression: &str, name: &str) {
        let alias = self.database.escape_identifier(&format!("__{}", name));
        let sql = match function {
            Some(function) => format!("{}({}) AS {}", function, expression, alias),
            None => format!("{} AS {}", expression, alias),
        };
        self.select.insert(format!("__{}", name), sql);
    }

    pub fn select_items(&self) -> Vec<&str> {
        self.select.values().map(String::as_str).collect()
    }

    pub fn add_from_item(&mut self, table: &str) {
        let root_key = self.root_key();
        let alias = self.table_alias(&root_key);
        let db = self.database;
        let item = format!(
            "{} AS {}",
            db.escape_identifier(table),
            db.escape_identifier(&alias)
        );
        if !self.from.contains(&item) {
            self.from.push(item);
        }
    }

    fn root_key(&self) -> String {
        self.table_aliases
            .get_index(0)
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| self.root_table_name.clone())
    }

    /// Register a join, at most once per join
    ///
    /// Joining the same relationship again is a no-op, unless the new join
    /// carries a condition that differs from the existing one.
    pub fn add_join_item(&mut self, join: JoinItem, condition: Option<&Condition>) -> QueryResult<()> {
        let table_alias = self.table_alias(&join.alias_key);
        let parent_alias = self.table_alias(&join.parent_alias_key);
        let index = join.to_sql(self.database, &table_alias, &parent_alias);

        // Rendering the condition joins its own columns, which may register
        // this join without a condition; that entry is replaced below
        let existing = self.joins.get(&index).cloned();

        let mut item = SqlText::sql(index.clone());
        let mut has_condition = false;
        if let Some(condition) = condition {
            if let Some(sql) = condition.where_clause(self, false)? {
                item.push_str(" AND ");
                item.append(sql);
                has_condition = true;
            }
        }

        if let Some(existing) = existing {
            if has_condition && existing != item {
                return Err(QueryError::caller(format!(
                    "Join already exists with a different condition: {}",
                    index
                )));
            }
            return Ok(());
        }
        crate::debug_log!("Joining {} as {}", join.table, table_alias);
        self.joins.insert(index, item);
        Ok(())
    }

    pub fn add_where_item(&mut self, sql: SqlText) {
        self.where_items.push(sql);
    }

    pub fn add_order_by_item(&mut self, sql: SqlText) {
        self.order_by.push(sql);
    }

    pub fn add_group_by_item(&mut self, sql: String) {
        self.group_by.push(sql);
    }

    pub fn group_by_items(&self) -> &[String] {
        &self.group_by
    }

    pub fn add_having_item(&mut self, sql: SqlText) {
        self.having.push(sql);
    }

    pub fn having_items(&self) -> &[SqlText] {
        &self.having
    }

    pub fn set_limit_info(&mut self, info: String) {
        self.limit_info = Some(info);
    }

    pub fn limit_info(&self) -> Option<&str> {
        self.limit_info.as_deref()
    }

    pub fn set_distinct_flag(&mut self) {
        self.distinct = true;
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn set_count_only_flag(&mut self) {
        self.count_only = true;
    }

    pub fn is_count_only(&self) -> bool {
        self.count_only
    }

    pub fn set_virtual_node(&mut self, name: &str, node: Node) {
        self.virtual_nodes.insert(name.to_string(), node);
    }

    pub fn has_virtual_node(&self, name: &str) -> bool {
        self.virtual_nodes.contains_key(name)
    }

    pub fn virtual_node(&self, name: &str) -> QueryResult<Node> {
        self.virtual_nodes.get(name).cloned().ok_or_else(|| {
            QueryError::caller(format!(
                "Virtual node \"{}\" is not defined; expand or aggregate it first",
                name
            ))
        })
    }

    /// Remember a to-many relation whose rows are collected per parent
    pub fn add_expand_as_array_node(&mut self, node: &Node) -> QueryResult<()> {
        if node.node_type() == NodeType::Association {
            return Err(QueryError::caller(format!(
                "Expand-as-array targets must be tables, got association \"{}\"",
                node.name()
            )));
        }
        self.expand_as_array
            .insert(node.full_alias()?, node.clone());
        Ok(())
    }

    /// Expand-as-array nodes by full alias, in registration order
    pub fn expand_as_array_nodes(&self) -> &IndexMap<String, Node> {
        &self.expand_as_array
    }

    pub(crate) fn is_processed(&self, id: u64) -> bool {
        self.processed.contains(&id)
    }

    pub(crate) fn mark_processed(&mut self, id: u64) {
        self.processed.insert(id);
    }
}
