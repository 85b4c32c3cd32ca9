//! Comparison conditions: a column tested against operands

use super::{Condition, ConditionKind, InOperand};
use crate::errors::{QueryError, QueryResult};
use crate::named::SqlText;
use crate::node::Node;
use crate::operand::Operand;
use crate::query_builder::QueryBuilder;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,      // =
    Ne,      // !=
    Gt,      // >
    Gte,     // >=
    Lt,      // <
    Lte,     // <=
    Like,    // LIKE
    NotLike, // NOT LIKE
}

impl QueryOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::NotLike => "NOT LIKE",
        }
    }
}

fn left_node(node: &Node) -> QueryResult<Node> {
    node.clone()
        .into_column("Condition")
        .map_err(QueryError::increment_offset)
}

fn right_operand(operand: Operand) -> QueryResult<Operand> {
    match operand {
        Operand::Node(node) => Ok(Operand::Node(
            node.into_column("Comparison operand")
                .map_err(QueryError::increment_offset)?,
        )),
        other => Ok(other),
    }
}

fn sub_query(node: Node, context: &str) -> QueryResult<Node> {
    if node.is_sub_query() {
        Ok(node)
    } else {
        Err(QueryError::invalid_cast(format!(
            "{} needs a sub-query node, got {:?} node \"{}\"",
            context,
            node.node_type(),
            node.name()
        )))
    }
}

impl Condition {
    pub fn compare(
        node: &Node,
        operator: QueryOperator,
        operand: impl Into<Operand>,
    ) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Comparison {
            node: left_node(node)?,
            operator,
            operand: right_operand(operand.into())?,
        }))
    }

    /// `= value`, or `IS NULL` for a null value
    pub fn equal(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Eq, operand)
    }

    /// `!= value`, or `IS NOT NULL` for a null value
    pub fn not_equal(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Ne, operand)
    }

    pub fn greater_than(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Gt, operand)
    }

    pub fn greater_or_equal(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Gte, operand)
    }

    pub fn less_than(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Lt, operand)
    }

    pub fn less_or_equal(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Lte, operand)
    }

    pub fn like(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::Like, operand)
    }

    pub fn not_like(node: &Node, operand: impl Into<Operand>) -> QueryResult<Condition> {
        Condition::compare(node, QueryOperator::NotLike, operand)
    }

    pub fn between(
        node: &Node,
        min: impl Into<Operand>,
        max: impl Into<Operand>,
    ) -> QueryResult<Condition> {
        Condition::between_impl(node, min.into(), max.into(), false)
    }

    pub fn not_between(
        node: &Node,
        min: impl Into<Operand>,
        max: impl Into<Operand>,
    ) -> QueryResult<Condition> {
        Condition::between_impl(node, min.into(), max.into(), true)
    }

    fn between_impl(node: &Node, min: Operand, max: Operand, negated: bool) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Between {
            node: left_node(node)?,
            min: right_operand(min)?,
            max: right_operand(max)?,
            negated,
        }))
    }

    pub fn is_in(node: &Node, operand: impl Into<InOperand>) -> QueryResult<Condition> {
        Condition::in_impl(node, operand.into(), false)
    }

    pub fn not_in(node: &Node, operand: impl Into<InOperand>) -> QueryResult<Condition> {
        Condition::in_impl(node, operand.into(), true)
    }

    fn in_impl(node: &Node, operand: InOperand, negated: bool) -> QueryResult<Condition> {
        let operand = match operand {
            InOperand::SubQuery(sub) => InOperand::SubQuery(sub_query(sub, "IN")?),
            other => other,
        };
        Ok(Condition::from_kind(ConditionKind::In {
            node: left_node(node)?,
            operand,
            negated,
        }))
    }

    pub fn is_null(node: &Node) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Null {
            node: left_node(node)?,
            negated: false,
        }))
    }

    pub fn is_not_null(node: &Node) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Null {
            node: left_node(node)?,
            negated: true,
        }))
    }

    pub fn exists(sub: Node) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Exists {
            sub_query: sub_query(sub, "EXISTS")?,
            negated: false,
        }))
    }

    pub fn not_exists(sub: Node) -> QueryResult<Condition> {
        Ok(Condition::from_kind(ConditionKind::Exists {
            sub_query: sub_query(sub, "NOT EXISTS")?,
            negated: true,
        }))
    }

    pub(super) fn render_comparison(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<SqlText> {
        match self.kind() {
            ConditionKind::Comparison {
                node,
                operator,
                operand,
            } => {
                let mut sql = SqlText::sql(node.column_alias(builder)?);
                sql.push_str(" ");
                match operator {
                    QueryOperator::Eq => sql.append(operand.to_sql(builder, true, false)?),
                    QueryOperator::Ne => sql.append(operand.to_sql(builder, true, true)?),
                    other => {
                        sql.push_str(other.to_sql());
                        sql.push_str(" ");
                        sql.append(operand.to_sql(builder, false, false)?);
                    }
                }
                Ok(sql)
            }
            ConditionKind::Between {
                node,
                min,
                max,
                negated,
            } => {
                let mut sql = SqlText::sql(node.column_alias(builder)?);
                sql.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                sql.append(min.to_sql(builder, false, false)?);
                sql.push_str(" AND ");
                sql.append(max.to_sql(builder, false, false)?);
                Ok(sql)
            }
            ConditionKind::In {
                node,
                operand,
                negated,
            } => {
                let keyword = if *negated { " NOT IN " } else { " IN " };
                match operand {
                    InOperand::Values(values) if values.is_empty() => {
                        Ok(SqlText::sql(if *negated { "1=1" } else { "1=0" }))
                    }
                    InOperand::Values(values) => {
                        let db = builder.database();
                        let items: Vec<String> = values
                            .iter()
                            .map(|value| db.sql_variable(value, false, false))
                            .collect();
                        let alias = node.column_alias(builder)?;
                        Ok(SqlText::sql(format!("{}{}({})", alias, keyword, items.join(","))))
                    }
                    InOperand::Named(named) => {
                        let mut sql = SqlText::new();
                        sql.push_in_list(&node.column_alias(builder)?, named.name(), *negated);
                        Ok(sql)
                    }
                    InOperand::SubQuery(sub) => {
                        let alias = node.column_alias(builder)?;
                        let sub_sql = sub.column_alias(builder)?;
                        Ok(SqlText::sql(format!("{}{}{}", alias, keyword, sub_sql)))
                    }
                }
            }
            ConditionKind::Null { node, negated } => Ok(SqlText::sql(format!(
                "{} {}",
                node.column_alias(builder)?,
                if *negated { "IS NOT NULL" } else { "IS NULL" }
            ))),
            ConditionKind::Exists { sub_query, negated } => Ok(SqlText::sql(format!(
                "{}{}",
                if *negated { "NOT EXISTS " } else { "EXISTS " },
                sub_query.column_alias(builder)?
            ))),
            _ => Err(QueryError::caller("Not a comparison condition")),
        }
    }
}
