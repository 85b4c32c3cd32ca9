//! AND / OR / NOT

use super::{Condition, ConditionKind};
use crate::errors::{QueryError, QueryResult};
use crate::named::SqlText;
use crate::query_builder::QueryBuilder;

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// One argument of `and` / `or`: a condition or a nested list of them
#[derive(Debug, Clone)]
pub enum ConditionGroup {
    Single(Condition),
    Many(Vec<Condition>),
}

impl From<Condition> for ConditionGroup {
    fn from(condition: Condition) -> Self {
        ConditionGroup::Single(condition)
    }
}

impl From<Vec<Condition>> for ConditionGroup {
    fn from(conditions: Vec<Condition>) -> Self {
        ConditionGroup::Many(conditions)
    }
}

impl Condition {
    pub fn and<I>(conditions: I) -> QueryResult<Condition>
    where
        I: IntoIterator,
        I::Item: Into<ConditionGroup>,
    {
        Condition::logical(LogicalOperator::And, conditions)
    }

    pub fn or<I>(conditions: I) -> QueryResult<Condition>
    where
        I: IntoIterator,
        I::Item: Into<ConditionGroup>,
    {
        Condition::logical(LogicalOperator::Or, conditions)
    }

    /// Combine conditions, flattening nested lists one level
    pub fn logical<I>(operator: LogicalOperator, conditions: I) -> QueryResult<Condition>
    where
        I: IntoIterator,
        I::Item: Into<ConditionGroup>,
    {
        let mut flat = Vec::new();
        for group in conditions {
            match group.into() {
                ConditionGroup::Single(condition) => flat.push(condition),
                ConditionGroup::Many(list) => flat.extend(list),
            }
        }
        if flat.is_empty() {
            return Err(QueryError::caller(format!(
                "No conditions passed to logical {}",
                operator.to_sql()
            )));
        }
        Ok(Condition::from_kind(ConditionKind::Logical {
            operator,
            conditions: flat,
        }))
    }

    pub fn not(condition: Condition) -> Condition {
        Condition::from_kind(ConditionKind::Not(condition))
    }

    pub(super) fn render_logical(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<SqlText> {
        match self.kind() {
            ConditionKind::Logical {
                operator,
                conditions,
            } => {
                let mut parts = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    if let Some(sql) = condition
                        .where_clause(builder, false)
                        .map_err(QueryError::increment_offset)?
                    {
                        parts.push(sql);
                    }
                }
                let mut sql = SqlText::sql("(");
                sql.append(SqlText::join(parts, &format!(" {} ", operator.to_sql())));
                sql.push_str(")");
                Ok(sql)
            }
            ConditionKind::Not(condition) => {
                let mut sql = SqlText::sql("(NOT ");
                sql.append(
                    condition
                        .render(builder)
                        .map_err(QueryError::increment_offset)?,
                );
                sql.push_str(")");
                Ok(sql)
            }
            _ => Err(QueryError::caller("Not a logical condition")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StandardDialect;
    use crate::named::NamedValue;
    use crate::node::{Node, TableInfo};
    use type_mapping::SqlType;

    fn person() -> Node {
        Node::table(
            TableInfo::new("person", "id")
                .with_column("first_name", SqlType::Text)
                .with_column("age", SqlType::Integer),
        )
        .unwrap()
    }

    fn render(condition: &Condition, root: &Node) -> String {
        let db = StandardDialect::new();
        let mut builder = QueryBuilder::new(&db, root).unwrap();
        condition
            .where_clause(&mut builder, false)
            .unwrap()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_empty_logical_fails() {
        let err = Condition::and(Vec::<Condition>::new()).unwrap_err();
        assert!(err.is_caller());
        assert!(Condition::or([Vec::<Condition>::new()]).unwrap_err().is_caller());
    }

    #[test]
    fn test_single_child_is_parenthesized() {
        let root = person();
        let age = root.column("age").unwrap();
        let single = Condition::and([Condition::equal(&age, 1).unwrap()]).unwrap();
        assert_eq!(render(&single, &root), "(\"t0\".\"age\" = 1)");
    }

    #[test]
    fn test_nested_lists_are_flattened() {
        let root = person();
        let age = root.column("age").unwrap();
        let name = root.column("first_name").unwrap();
        let or = Condition::or(vec![
            ConditionGroup::from(Condition::is_null(&name).unwrap()),
            ConditionGroup::from(vec![
                Condition::less_than(&age, 13).unwrap(),
                Condition::greater_than(&age, NamedValue::new("max")).unwrap(),
            ]),
        ])
        .unwrap();
        assert_eq!(
            render(&or, &root),
            "(\"t0\".\"first_name\" IS NULL OR \"t0\".\"age\" < 13 OR \"t0\".\"age\" > {max})"
        );
    }

    #[test]
    fn test_not_wraps_child() {
        let root = person();
        let age = root.column("age").unwrap();
        let not = Condition::not(
            Condition::and([
                Condition::greater_than(&age, 1).unwrap(),
                Condition::less_than(&age, 5).unwrap(),
            ])
            .unwrap(),
        );
        assert_eq!(
            render(&not, &root),
            "(NOT (\"t0\".\"age\" > 1 AND \"t0\".\"age\" < 5))"
        );
    }
}
