//! Aggregate functions exposed as virtual attributes

use type_mapping::SqlType;

use crate::errors::{QueryError, QueryResult};
use crate::node::{virtual_alias, Node};
use crate::query_builder::QueryBuilder;

/// Represents SQL aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// `FUNC(column) AS __name`, referable later as virtual attribute `name`
#[derive(Debug, Clone)]
pub struct Aggregate {
    function: AggregateFunction,
    expression: Node,
    attribute_name: String,
}

impl Aggregate {
    pub fn new(function: AggregateFunction, node: &Node, attribute_name: &str) -> QueryResult<Self> {
        let column = node
            .clone()
            .into_column(function.to_sql())
            .map_err(QueryError::increment_offset)?;
        let attribute_name = virtual_alias(attribute_name);
        if attribute_name.is_empty() {
            return Err(QueryError::caller("Aggregate attribute name cannot be empty"));
        }
        let sql_type = match function {
            AggregateFunction::Count => SqlType::Integer,
            AggregateFunction::Avg => SqlType::Float,
            _ => column.sql_type(),
        };
        let expression = Node::typed_function(function.to_sql(), vec![column.into()], sql_type)?;
        Ok(Self {
            function,
            expression,
            attribute_name,
        })
    }

    pub fn count(node: &Node, attribute_name: &str) -> QueryResult<Self> {
        Aggregate::new(AggregateFunction::Count, node, attribute_name)
    }

    pub fn sum(node: &Node, attribute_name: &str) -> QueryResult<Self> {
        Aggregate::new(AggregateFunction::Sum, node, attribute_name)
    }

    pub fn average(node: &Node, attribute_name: &str) -> QueryResult<Self> {
        Aggregate::new(AggregateFunction::Avg, node, attribute_name)
    }

    pub fn minimum(node: &Node, attribute_name: &str) -> QueryResult<Self> {
        Aggregate::new(AggregateFunction::Min, node, attribute_name)
    }

    pub fn maximum(node: &Node, attribute_name: &str) -> QueryResult<Self> {
        Aggregate::new(AggregateFunction::Max, node, attribute_name)
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        builder.set_virtual_node(&self.attribute_name, self.expression.clone());
        let sql = self.expression.column_alias(builder)?;
        builder.add_select_function(None, &sql, &self.attribute_name);
        Ok(())
    }
}
