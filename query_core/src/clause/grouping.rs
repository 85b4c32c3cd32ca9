//! GROUP BY and HAVING

use crate::condition::Condition;
use crate::errors::{QueryError, QueryResult};
use crate::named::SqlText;
use crate::node::{Node, NodeType};
use crate::query_builder::QueryBuilder;

#[derive(Debug, Clone)]
pub struct GroupBy {
    nodes: Vec<Node>,
}

impl GroupBy {
    /// Table nodes group by their primary key
    pub fn new<I>(nodes: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = Node>,
    {
        let mut grouped = Vec::new();
        for node in nodes {
            if node.node_type() == NodeType::Association {
                return Err(QueryError::caller(format!(
                    "GroupBy cannot use association node \"{}\"",
                    node.name()
                )));
            }
            grouped.push(node.into_column("GroupBy")?);
        }
        if grouped.is_empty() {
            return Err(QueryError::caller("No parameters passed in to GroupBy clause"));
        }
        Ok(Self { nodes: grouped })
    }

    pub fn single(node: Node) -> QueryResult<Self> {
        GroupBy::new([node])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        for node in &self.nodes {
            let alias = node.column_alias(builder)?;
            builder.add_group_by_item(alias);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum HavingTarget {
    Expression(Node),
    Condition(Condition),
}

/// Filter over grouped rows
#[derive(Debug, Clone)]
pub struct Having {
    target: HavingTarget,
}

impl Having {
    /// A computed expression such as a sub-select or function
    pub fn new(node: Node) -> QueryResult<Self> {
        match node.node_type() {
            NodeType::Function | NodeType::Math | NodeType::SubQuerySql | NodeType::SubQueryCount => {
                Ok(Self {
                    target: HavingTarget::Expression(node),
                })
            }
            other => Err(QueryError::caller(format!(
                "Having needs an expression node, got {:?} node \"{}\"",
                other,
                node.name()
            ))),
        }
    }

    pub fn condition(condition: Condition) -> Self {
        Self {
            target: HavingTarget::Condition(condition),
        }
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        match &self.target {
            HavingTarget::Expression(node) => {
                let sql = node.column_alias(builder)?;
                builder.add_having_item(SqlText::sql(sql));
            }
            HavingTarget::Condition(condition) => {
                if let Some(sql) = condition.where_clause(builder, false)? {
                    builder.add_having_item(sql);
                }
            }
        }
        Ok(())
    }
}
