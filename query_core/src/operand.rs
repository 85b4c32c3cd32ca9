//! Right-hand operands of conditions and function arguments

use type_mapping::SqlValue;

use crate::errors::QueryResult;
use crate::named::{NamedValue, ParameterForm, SqlText};
use crate::node::Node;
use crate::query_builder::QueryBuilder;

/// A value, a deferred named value, or another node
#[derive(Debug, Clone)]
pub enum Operand {
    Value(SqlValue),
    Named(NamedValue),
    Node(Node),
}

impl Operand {
    /// Render the operand, optionally as a complete `= x` / `!= x` right-hand side
    pub(crate) fn to_sql(
        &self,
        builder: &mut QueryBuilder<'_>,
        include_equality: bool,
        reverse_equality: bool,
    ) -> QueryResult<SqlText> {
        match self {
            Operand::Named(named) => {
                let form = match (include_equality, reverse_equality) {
                    (false, _) => ParameterForm::Plain,
                    (true, false) => ParameterForm::Equal,
                    (true, true) => ParameterForm::NotEqual,
                };
                Ok(named.parameter(form))
            }
            Operand::Node(node) => {
                let alias = node.column_alias(builder)?;
                let operator = match (include_equality, reverse_equality) {
                    (false, _) => "",
                    (true, false) => "= ",
                    (true, true) => "!= ",
                };
                Ok(SqlText::sql(format!("{}{}", operator, alias)))
            }
            Operand::Value(value) => Ok(SqlText::sql(builder.database().sql_variable(
                value,
                include_equality,
                reverse_equality,
            ))),
        }
    }
}

impl From<Node> for Operand {
    fn from(node: Node) -> Self {
        Operand::Node(node)
    }
}

impl From<&Node> for Operand {
    fn from(node: &Node) -> Self {
        Operand::Node(node.clone())
    }
}

impl From<NamedValue> for Operand {
    fn from(named: NamedValue) -> Self {
        Operand::Named(named)
    }
}

impl From<SqlValue> for Operand {
    fn from(value: SqlValue) -> Self {
        Operand::Value(value)
    }
}

macro_rules! value_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Value(value.into())
                }
            }
        )*
    };
}

value_operand!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    bool,
    &str,
    String,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value
);

impl<T> From<Option<T>> for Operand
where
    T: Into<SqlValue>,
{
    fn from(value: Option<T>) -> Self {
        Operand::Value(value.into())
    }
}
