use crate::errors::{QueryError, QueryResult};
use crate::node::{Node, NodeType};
use crate::query_builder::QueryBuilder;

/// Explicit column list for the root table and expanded tables
#[derive(Debug, Clone, Default)]
pub struct Select {
    nodes: Vec<Node>,
    skip_primary_key: bool,
}

impl Select {
    pub fn new<I>(nodes: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes = nodes
            .into_iter()
            .map(|node| {
                let column = node
                    .into_column("Select")
                    .map_err(|err| QueryError::caller(err_message(&err)))?;
                if column.node_type() != NodeType::Column {
                    return Err(QueryError::caller(format!(
                        "Select can only list columns, got {:?} node \"{}\"",
                        column.node_type(),
                        column.name()
                    )));
                }
                Ok(column)
            })
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self {
            nodes,
            skip_primary_key: false,
        })
    }

    /// Leave the primary key out of the selected columns
    pub fn with_skip_primary_key(mut self, skip: bool) -> Self {
        self.skip_primary_key = skip;
        self
    }

    pub fn skips_primary_key(&self) -> bool {
        self.skip_primary_key
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Combine with another select; skipping the key wins
    pub fn merge(&mut self, other: &Select) {
        for node in &other.nodes {
            if !self.nodes.iter().any(|existing| existing.ptr_eq(node)) {
                self.nodes.push(node.clone());
            }
        }
        self.skip_primary_key |= other.skip_primary_key;
    }

    /// Add the listed columns that belong to `table_key`
    pub(crate) fn add_select_items(
        &self,
        builder: &mut QueryBuilder<'_>,
        table_key: &str,
        alias_prefix: &str,
    ) -> QueryResult<()> {
        for node in &self.nodes {
            if node.table_key()? == table_key {
                builder.add_select_item(
                    table_key,
                    node.name(),
                    &format!("{}{}", alias_prefix, node.name()),
                );
            }
        }
        Ok(())
    }
}

fn err_message(err: &QueryError) -> String {
    match err {
        QueryError::Caller { message, .. } | QueryError::InvalidCast { message, .. } => {
            message.clone()
        }
        other => other.to_string(),
    }
}
