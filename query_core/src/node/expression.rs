//! Computed nodes and column alias rendering

use type_mapping::SqlType;

use super::{Node, NodeKind, NodeType};
use crate::errors::{QueryError, QueryResult};
use crate::operand::Operand;
use crate::query_builder::QueryBuilder;

/// Normalized name of a virtual attribute
pub fn virtual_alias(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

impl Node {
    /// Named, computed attribute
    ///
    /// With a sub-query the node computes the value itself; without one it
    /// refers to a virtual attribute registered earlier in the same query.
    pub fn virtual_node(name: &str, sub_query: Option<Node>) -> QueryResult<Node> {
        let alias = virtual_alias(name);
        if alias.is_empty() {
            return Err(QueryError::caller("Virtual node name cannot be empty"));
        }
        let sql_type = match &sub_query {
            Some(node) if node.is_expression() && node.node_type() != NodeType::Virtual => {
                node.sql_type()
            }
            Some(node) => {
                return Err(QueryError::invalid_cast(format!(
                    "Virtual node \"{}\" needs an expression, got {:?} node \"{}\"",
                    alias,
                    node.node_type(),
                    node.name()
                )))
            }
            None => SqlType::Text,
        };
        Ok(Node::expression(
            alias,
            sql_type,
            NodeKind::Virtual { sub_query },
        ))
    }

    /// SQL function call such as `LOWER(x)` or `IFNULL(a, b)`
    pub fn function(name: &str, params: Vec<Operand>) -> QueryResult<Node> {
        let params = expression_params(params, name)?;
        let sql_type = first_param_type(&params);
        Ok(Node::expression(
            name.to_string(),
            sql_type,
            NodeKind::Function {
                function: name.to_string(),
                params,
            },
        ))
    }

    /// Function node with an explicit result type
    pub fn typed_function(name: &str, params: Vec<Operand>, sql_type: SqlType) -> QueryResult<Node> {
        let params = expression_params(params, name)?;
        Ok(Node::expression(
            name.to_string(),
            sql_type,
            NodeKind::Function {
                function: name.to_string(),
                params,
            },
        ))
    }

    /// Arithmetic over operands: one operand renders as a prefix applied to
    /// its parenthesised operand, several are joined with the operator
    pub fn math(operation: &str, params: Vec<Operand>) -> QueryResult<Node> {
        if params.is_empty() {
            return Err(QueryError::caller(format!(
                "Math operation \"{}\" needs at least one operand",
                operation
            )));
        }
        let params = expression_params(params, operation)?;
        let sql_type = first_param_type(&params);
        Ok(Node::expression(
            "math".to_string(),
            sql_type,
            NodeKind::Math {
                operation: operation.to_string(),
                params,
            },
        ))
    }

    pub fn add(a: impl Into<Operand>, b: impl Into<Operand>) -> QueryResult<Node> {
        Node::math("+", vec![a.into(), b.into()])
    }

    pub fn sub(a: impl Into<Operand>, b: impl Into<Operand>) -> QueryResult<Node> {
        Node::math("-", vec![a.into(), b.into()])
    }

    pub fn mul(a: impl Into<Operand>, b: impl Into<Operand>) -> QueryResult<Node> {
        Node::math("*", vec![a.into(), b.into()])
    }

    pub fn div(a: impl Into<Operand>, b: impl Into<Operand>) -> QueryResult<Node> {
        Node::math("/", vec![a.into(), b.into()])
    }

    pub fn neg(a: impl Into<Operand>) -> QueryResult<Node> {
        Node::math("-", vec![a.into()])
    }

    /// Raw SQL sub-query; `{1}`, `{2}`, ... are replaced by the column
    /// aliases of `nodes`
    pub fn sub_sql(sql: &str, nodes: Vec<Node>) -> QueryResult<Node> {
        let nodes = nodes
            .into_iter()
            .map(|node| node.into_column("SubSql"))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Node::expression(
            "sub_sql".to_string(),
            SqlType::Text,
            NodeKind::SubQuerySql {
                sql: sql.to_string(),
                nodes,
            },
        ))
    }

    /// Correlated `COUNT(*)` over a reverse reference or association
    pub fn sub_query_count(&self) -> QueryResult<Node> {
        match self.node_type() {
            NodeType::ReverseReference | NodeType::Association => Ok(Node::expression(
                format!("{}_count", self.name()),
                SqlType::Integer,
                NodeKind::SubQueryCount {
                    relation: self.clone(),
                },
            )),
            other => Err(QueryError::caller(format!(
                "Cannot count rows of {:?} node \"{}\"",
                other,
                self.name()
            ))),
        }
    }

    /// SQL expression for this node, joining whatever tables it needs
    pub fn column_alias(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<String> {
        match self.kind() {
            NodeKind::Column => {
                self.join(builder, false, None, None)
                    .map_err(QueryError::increment_offset)?;
                let parent = self.parent()?.ok_or_else(|| {
                    QueryError::caller(format!("Column \"{}\" has no table", self.name()))
                })?;
                let table_alias = builder.table_alias(&parent.full_alias()?);
                let db = builder.database();
                Ok(format!(
                    "{}.{}",
                    db.escape_identifier(&table_alias),
                    db.escape_identifier(self.name())
                ))
            }
            NodeKind::Table { .. } | NodeKind::ReverseReference { .. } => {
                match self.primary_key_node()? {
                    Some(pk) => pk.column_alias(builder),
                    None => Err(QueryError::invalid_cast(format!(
                        "Table node \"{}\" has no primary key",
                        self.name()
                    ))),
                }
            }
            NodeKind::Association { .. } => Err(QueryError::invalid_cast(format!(
                "Association node \"{}\" cannot be used as a column",
                self.name()
            ))),
            NodeKind::Virtual {
                sub_query: Some(sub_query),
            } => {
                builder.set_virtual_node(self.name(), sub_query.clone());
                sub_query.column_alias(builder)
            }
            NodeKind::Virtual { sub_query: None } => {
                let registered = builder
                    .virtual_node(self.name())
                    .map_err(QueryError::increment_offset)?;
                registered.column_alias(builder)
            }
            NodeKind::Function { function, params } => {
                let rendered = render_params(params, builder)?;
                Ok(format!("{}({})", function, rendered.join(", ")))
            }
            NodeKind::Math { operation, params } => {
                let rendered = render_params(params, builder)?;
                if rendered.len() == 1 {
                    Ok(format!("{}({})", operation, rendered[0]))
                } else {
                    Ok(format!(
                        "({})",
                        rendered.join(&format!(" {} ", operation))
                    ))
                }
            }
            NodeKind::SubQuerySql { sql, nodes } => {
                let mut sql = sql.clone();
                for (index, node) in nodes.iter().enumerate() {
                    let alias = node.column_alias(builder)?;
                    sql = sql.replace(&format!("{{{}}}", index + 1), &alias);
                }
                Ok(format!("({})", sql))
            }
            NodeKind::SubQueryCount { relation } => relation.count_sub_select(builder),
        }
    }

    fn count_sub_select(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<String> {
        let parent = self.parent()?.ok_or_else(|| {
            QueryError::caller(format!("Relation \"{}\" has no parent", self.name()))
        })?;
        parent.join(builder, false, None, None)?;
        let parent_key = parent.primary_key().map(str::to_string).ok_or_else(|| {
            QueryError::caller(format!(
                "Parent of relation \"{}\" has no primary key",
                self.name()
            ))
        })?;
        let (table, column) = match self.kind() {
            NodeKind::ReverseReference { table, foreign_key } => {
                (table.name().to_string(), foreign_key.clone())
            }
            NodeKind::Association {
                junction_table,
                parent_key,
                ..
            } => (junction_table.clone(), parent_key.clone()),
            _ => {
                return Err(QueryError::caller(format!(
                    "Cannot count rows of node \"{}\"",
                    self.name()
                )))
            }
        };
        let parent_alias = builder.table_alias(&parent.full_alias()?);
        let count_alias = builder.table_alias(&format!("{}__count", self.full_alias()?));
        let db = builder.database();
        Ok(format!(
            "(SELECT COUNT(*) FROM {} AS {} WHERE {}.{} = {}.{})",
            db.escape_identifier(&table),
            db.escape_identifier(&count_alias),
            db.escape_identifier(&count_alias),
            db.escape_identifier(&column),
            db.escape_identifier(&parent_alias),
            db.escape_identifier(&parent_key)
        ))
    }
}

/// Function and math operands: named values cannot be rendered inline and
/// tables stand for their primary key
fn expression_params(params: Vec<Operand>, context: &str) -> QueryResult<Vec<Operand>> {
    params
        .into_iter()
        .map(|param| match param {
            Operand::Named(named) => Err(QueryError::invalid_cast(format!(
                "{}: named value \"{}\" cannot be used as a function parameter",
                context,
                named.name()
            ))),
            Operand::Node(node) => Ok(Operand::Node(node.into_column(context)?)),
            value => Ok(value),
        })
        .collect()
}

fn first_param_type(params: &[Operand]) -> SqlType {
    match params.first() {
        Some(Operand::Node(node)) => node.sql_type(),
        Some(Operand::Value(value)) => value.sql_type().unwrap_or_default(),
        _ => SqlType::Text,
    }
}

fn render_params(params: &[Operand], builder: &mut QueryBuilder<'_>) -> QueryResult<Vec<String>> {
    params
        .iter()
        .map(|param| param.to_sql(builder, false, false)?.to_sql())
        .collect()
}
