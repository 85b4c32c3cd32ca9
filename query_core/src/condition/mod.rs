//! Boolean conditions
//!
//! Conditions render themselves recursively into complete SQL fragments.
//! A builder remembers which conditions it already rendered so that a
//! condition shared between, say, WHERE and a join is emitted once.

pub mod comparison;
pub mod logical;

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::QueryResult;
use crate::named::{NamedValue, SqlText};
use crate::node::Node;
use crate::operand::Operand;
use crate::query_builder::QueryBuilder;
use type_mapping::SqlValue;

pub use comparison::QueryOperator;
pub use logical::{ConditionGroup, LogicalOperator};

static NEXT_CONDITION_ID: AtomicU64 = AtomicU64::new(1);

/// Right-hand side of `IN` / `NOT IN`
#[derive(Debug, Clone)]
pub enum InOperand {
    /// A list bound at execution time
    Named(NamedValue),
    /// A sub-select node
    SubQuery(Node),
    Values(Vec<SqlValue>),
}

impl From<NamedValue> for InOperand {
    fn from(named: NamedValue) -> Self {
        InOperand::Named(named)
    }
}

impl From<Node> for InOperand {
    fn from(node: Node) -> Self {
        InOperand::SubQuery(node)
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for InOperand {
    fn from(values: Vec<T>) -> Self {
        InOperand::Values(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug)]
pub(crate) enum ConditionKind {
    All,
    None,
    Comparison {
        node: Node,
        operator: QueryOperator,
        operand: Operand,
    },
    Between {
        node: Node,
        min: Operand,
        max: Operand,
        negated: bool,
    },
    In {
        node: Node,
        operand: InOperand,
        negated: bool,
    },
    Null {
        node: Node,
        negated: bool,
    },
    Exists {
        sub_query: Node,
        negated: bool,
    },
    Logical {
        operator: LogicalOperator,
        conditions: Vec<Condition>,
    },
    Not(Condition),
}

#[derive(Debug)]
struct ConditionData {
    id: u64,
    kind: ConditionKind,
}

/// Shared handle to a condition tree
#[derive(Debug, Clone)]
pub struct Condition(Rc<ConditionData>);

impl Condition {
    pub(crate) fn from_kind(kind: ConditionKind) -> Condition {
        Condition(Rc::new(ConditionData {
            id: NEXT_CONDITION_ID.fetch_add(1, Ordering::Relaxed),
            kind,
        }))
    }

    /// Always true
    pub fn all() -> Condition {
        Condition::from_kind(ConditionKind::All)
    }

    /// Always false
    pub fn none() -> Condition {
        Condition::from_kind(ConditionKind::None)
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub(crate) fn kind(&self) -> &ConditionKind {
        &self.0.kind
    }

    /// Add this condition to the builder's WHERE list, once per builder
    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        if let Some(sql) = self.where_clause(builder, true)? {
            builder.add_where_item(sql);
        }
        Ok(())
    }

    /// Render the condition
    ///
    /// With `process_once` a condition already rendered by this builder
    /// yields `None`.
    pub fn where_clause(
        &self,
        builder: &mut QueryBuilder<'_>,
        process_once: bool,
    ) -> QueryResult<Option<SqlText>> {
        if process_once && builder.is_processed(self.id()) {
            return Ok(None);
        }
        builder.mark_processed(self.id());
        let sql = self.render(builder)?;
        crate::trace_log!("Rendered condition {}: {}", self.id(), sql);
        Ok((!sql.is_empty()).then_some(sql))
    }

    pub(crate) fn render(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<SqlText> {
        match self.kind() {
            ConditionKind::All => Ok(SqlText::sql("1=1")),
            ConditionKind::None => Ok(SqlText::sql("1=0")),
            ConditionKind::Logical { .. } | ConditionKind::Not(_) => self.render_logical(builder),
            _ => self.render_comparison(builder),
        }
    }

    /// True when every column this condition tests belongs to `table_key`
    pub fn equal_tables(&self, table_key: &str) -> QueryResult<bool> {
        match self.kind() {
            ConditionKind::All | ConditionKind::None | ConditionKind::Exists { .. } => Ok(true),
            ConditionKind::Comparison { node, .. }
            | ConditionKind::Between { node, .. }
            | ConditionKind::In { node, .. }
            | ConditionKind::Null { node, .. } => Ok(node.table_key()? == table_key),
            ConditionKind::Logical { conditions, .. } => {
                for condition in conditions {
                    if !condition.equal_tables(table_key)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ConditionKind::Not(condition) => condition.equal_tables(table_key),
        }
    }
}
