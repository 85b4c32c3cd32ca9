//! Eager joins

use crate::clause::Select;
use crate::condition::Condition;
use crate::errors::{QueryError, QueryResult};
use crate::node::{Node, NodeType};
use crate::query_builder::QueryBuilder;

#[derive(Debug, Clone)]
enum ExpandTarget {
    Relation(Node),
    Virtual(Node),
}

/// Join a related table and select its columns inline
///
/// Expanding a virtual node selects its expression as `__name`.
#[derive(Debug, Clone)]
pub struct Expand {
    target: ExpandTarget,
    join_condition: Option<Condition>,
    select: Option<Select>,
}

impl Expand {
    pub fn new(node: &Node) -> QueryResult<Self> {
        let target = match node.node_type() {
            NodeType::Association => {
                return Err(QueryError::caller(format!(
                    "Expand cannot use association node \"{}\"; expand its child table instead",
                    node.name()
                )))
            }
            NodeType::Virtual => ExpandTarget::Virtual(node.clone()),
            _ if node.is_expression() || node.is_root() => {
                return Err(QueryError::invalid_cast(format!(
                    "Cannot expand on {:?} node \"{}\"",
                    node.node_type(),
                    node.name()
                )))
            }
            _ => ExpandTarget::Relation(node.clone()),
        };
        Ok(Self {
            target,
            join_condition: None,
            select: None,
        })
    }

    /// Extra condition appended to the join's ON clause
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.join_condition = Some(condition);
        self
    }

    /// Limit the columns selected from the expanded table
    pub fn with_select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        match &self.target {
            ExpandTarget::Relation(node) => node.join(
                builder,
                true,
                self.join_condition.as_ref(),
                self.select.as_ref(),
            ),
            ExpandTarget::Virtual(node) => {
                let sql = node.column_alias(builder)?;
                builder.add_select_function(None, &sql, node.name());
                Ok(())
            }
        }
    }
}

/// Join a to-many relation and collect the related rows as an array
#[derive(Debug, Clone)]
pub struct ExpandAsArray {
    node: Node,
    join_condition: Option<Condition>,
    select: Option<Select>,
}

impl ExpandAsArray {
    /// Reverse references expand directly; associations through their child table
    pub fn new(node: &Node) -> QueryResult<Self> {
        let node = match node.node_type() {
            NodeType::ReverseReference => node.clone(),
            NodeType::Association => node.child_table_node()?,
            other => {
                return Err(QueryError::caller(format!(
                    "ExpandAsArray needs a reverse reference or association, got {:?} node \"{}\"",
                    other,
                    node.name()
                )))
            }
        };
        Ok(Self {
            node,
            join_condition: None,
            select: None,
        })
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.join_condition = Some(condition);
        self
    }

    pub fn with_select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        self.node.join(
            builder,
            true,
            self.join_condition.as_ref(),
            self.select.as_ref(),
        )?;
        builder.add_expand_as_array_node(&self.node)
    }
}
