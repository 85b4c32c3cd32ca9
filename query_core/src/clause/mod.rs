//! Query-shaping clauses
//!
//! Each clause is applied once to a builder, in the order the caller lists
//! them. `Select` is the exception: it is merged up front and consulted when
//! the root and expanded tables put their columns.

pub mod aggregation;
pub mod expand;
pub mod grouping;
pub mod ordering;
pub mod pagination;
pub mod select;

use crate::errors::QueryResult;
use crate::query_builder::QueryBuilder;

pub use aggregation::{Aggregate, AggregateFunction};
pub use expand::{Expand, ExpandAsArray};
pub use grouping::{GroupBy, Having};
pub use ordering::{OrderBy, OrderItem, SortMarker, SortOrder};
pub use pagination::Limit;
pub use select::Select;

#[derive(Debug, Clone)]
pub enum Clause {
    Select(Select),
    OrderBy(OrderBy),
    GroupBy(GroupBy),
    Limit(Limit),
    Having(Having),
    Expand(Expand),
    ExpandAsArray(ExpandAsArray),
    Distinct,
    Aggregate(Aggregate),
}

impl Clause {
    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        match self {
            // Consumed when the select fields are put
            Clause::Select(_) => Ok(()),
            Clause::OrderBy(order_by) => order_by.update_query_builder(builder),
            Clause::GroupBy(group_by) => group_by.update_query_builder(builder),
            Clause::Limit(limit) => {
                limit.update_query_builder(builder);
                Ok(())
            }
            Clause::Having(having) => having.update_query_builder(builder),
            Clause::Expand(expand) => expand.update_query_builder(builder),
            Clause::ExpandAsArray(expand) => expand.update_query_builder(builder),
            Clause::Distinct => {
                builder.set_distinct_flag();
                Ok(())
            }
            Clause::Aggregate(aggregate) => aggregate.update_query_builder(builder),
        }
    }

    /// Merge every `Select` in `clauses` into one, if there is any
    pub fn extract_select(clauses: &[Clause]) -> Option<Select> {
        let mut merged: Option<Select> = None;
        for clause in clauses {
            if let Clause::Select(select) = clause {
                match &mut merged {
                    Some(existing) => existing.merge(select),
                    None => merged = Some(select.clone()),
                }
            }
        }
        merged
    }
}

macro_rules! clause_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Clause {
                fn from(clause: $variant) -> Self {
                    Clause::$variant(clause)
                }
            }
        )*
    };
}

clause_from!(Select, OrderBy, GroupBy, Limit, Having, Expand, ExpandAsArray, Aggregate);
