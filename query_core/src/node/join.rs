//! Joining node chains into a query builder

use super::{Node, NodeKind, NodeType};
use crate::clause::Select;
use crate::condition::Condition;
use crate::errors::{QueryError, QueryResult};
use crate::query_builder::JoinItem;
use crate::query_builder::QueryBuilder;

impl Node {
    /// Make sure this node's table, and every table above it, is joined
    ///
    /// With `expand_selection` the joined tables also contribute their
    /// columns to the select list, filtered by `select` when given.
    pub fn join(
        &self,
        builder: &mut QueryBuilder<'_>,
        expand_selection: bool,
        join_condition: Option<&Condition>,
        select: Option<&Select>,
    ) -> QueryResult<()> {
        match self.kind() {
            NodeKind::Column => match self.parent()? {
                Some(parent) => parent
                    .join(builder, expand_selection, join_condition, select)
                    .map_err(QueryError::increment_offset),
                None => Err(QueryError::caller(format!(
                    "Column \"{}\" has no table to join",
                    self.name()
                ))),
            },
            NodeKind::Table { table } => {
                let Some(parent) = self.parent()? else {
                    if table.name() != builder.root_table_name() {
                        return Err(QueryError::caller(format!(
                            "Cannot use node for \"{}\" when querying against the \"{}\" table",
                            table.name(),
                            builder.root_table_name()
                        )));
                    }
                    return Ok(());
                };

                // A condition on the far side of an association that only
                // tests the junction table belongs to the junction join
                let mut own_condition = join_condition;
                match join_condition {
                    Some(condition)
                        if parent.node_type() == NodeType::Association
                            && condition.equal_tables(&parent.full_alias()?)? =>
                    {
                        parent
                            .join(builder, expand_selection, Some(condition), select)
                            .map_err(QueryError::increment_offset)?;
                        own_condition = None;
                    }
                    _ => {
                        parent
                            .join(builder, expand_selection, None, select)
                            .map_err(QueryError::increment_offset)?;
                    }
                }
                self.check_join_condition(own_condition, table.name())?;

                let join = JoinItem {
                    table: table.name().to_string(),
                    alias_key: self.full_alias()?,
                    parent_alias_key: parent.full_alias()?,
                    parent_column: self.name().to_string(),
                    column: table.primary_key().to_string(),
                };
                builder
                    .add_join_item(join, own_condition)
                    .map_err(QueryError::increment_offset)?;
                if expand_selection {
                    self.put_select_fields(builder, Some(&self.full_alias()?), select)?;
                }
                Ok(())
            }
            NodeKind::ReverseReference { table, foreign_key } => {
                let parent = self.require_parent()?;
                parent
                    .join(builder, expand_selection, None, select)
                    .map_err(QueryError::increment_offset)?;
                self.check_join_condition(join_condition, table.name())?;

                let join = JoinItem {
                    table: table.name().to_string(),
                    alias_key: self.full_alias()?,
                    parent_alias_key: parent.full_alias()?,
                    parent_column: parent_primary_key(&parent, self.name())?,
                    column: foreign_key.clone(),
                };
                builder
                    .add_join_item(join, join_condition)
                    .map_err(QueryError::increment_offset)?;
                if expand_selection {
                    self.put_select_fields(builder, Some(&self.full_alias()?), select)?;
                }
                Ok(())
            }
            NodeKind::Association {
                junction_table,
                parent_key,
                ..
            } => {
                let parent = self.require_parent()?;
                parent
                    .join(builder, expand_selection, None, select)
                    .map_err(QueryError::increment_offset)?;
                self.check_join_condition(join_condition, junction_table)?;

                let join = JoinItem {
                    table: junction_table.clone(),
                    alias_key: self.full_alias()?,
                    parent_alias_key: parent.full_alias()?,
                    parent_column: parent_primary_key(&parent, self.name())?,
                    column: parent_key.clone(),
                };
                builder
                    .add_join_item(join, join_condition)
                    .map_err(QueryError::increment_offset)
            }
            // Expressions are rooted at themselves; their operands join on demand
            _ => Ok(()),
        }
    }

    /// Add this table's columns to the select list
    ///
    /// Without a prefix the columns are selected under their own names (the
    /// root table); with one they are aliased `prefix__column`.
    pub fn put_select_fields(
        &self,
        builder: &mut QueryBuilder<'_>,
        prefix: Option<&str>,
        select: Option<&Select>,
    ) -> QueryResult<()> {
        let table = self.table_info().ok_or_else(|| {
            QueryError::caller(format!(
                "Node \"{}\" has no columns to select",
                self.name()
            ))
        })?;
        let (table_key, alias_prefix) = match prefix {
            Some(prefix) => (prefix.to_string(), format!("{}__", prefix)),
            None => (self.full_alias()?, String::new()),
        };

        match select {
            Some(select) => {
                if !select.skips_primary_key() {
                    let pk = table.primary_key();
                    builder.add_select_item(&table_key, pk, &format!("{}{}", alias_prefix, pk));
                }
                select.add_select_items(builder, &table_key, &alias_prefix)
            }
            None => {
                for column in table.columns() {
                    builder.add_select_item(
                        &table_key,
                        &column.name,
                        &format!("{}{}", alias_prefix, column.name),
                    );
                }
                Ok(())
            }
        }
    }

    fn require_parent(&self) -> QueryResult<Node> {
        self.parent()?.ok_or_else(|| {
            QueryError::caller(format!("Node \"{}\" has no parent to join from", self.name()))
        })
    }

    fn check_join_condition(&self, condition: Option<&Condition>, table: &str) -> QueryResult<()> {
        match condition {
            Some(condition) if !condition.equal_tables(&self.full_alias()?)? => {
                Err(QueryError::caller(format!(
                    "The join condition on the \"{}\" table must only contain conditions for that table",
                    table
                )))
            }
            _ => Ok(()),
        }
    }
}

fn parent_primary_key(parent: &Node, child: &str) -> QueryResult<String> {
    parent.primary_key().map(str::to_string).ok_or_else(|| {
        QueryError::caller(format!(
            "Cannot join \"{}\": parent \"{}\" has no primary key",
            child,
            parent.name()
        ))
    })
}
