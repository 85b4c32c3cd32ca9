//! Complete queries against a root table

use crate::clause::Clause;
use crate::condition::Condition;
use crate::database::Database;
use crate::errors::{QueryError, QueryResult};
use crate::named::{NamedValues, SqlText};
use crate::node::Node;
use crate::query_builder::QueryBuilder;

/// A root node, an optional condition and clauses, ready to be rendered
#[derive(Debug, Clone)]
pub struct Query {
    root: Node,
    condition: Option<Condition>,
    clauses: Vec<Clause>,
    count_only: bool,
}

impl Query {
    pub fn new(root: &Node) -> Self {
        Self {
            root: root.clone(),
            condition: None,
            clauses: Vec::new(),
            count_only: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_clause(mut self, clause: impl Into<Clause>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn with_clauses<I>(mut self, clauses: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Clause>,
    {
        self.clauses.extend(clauses.into_iter().map(Into::into));
        self
    }

    pub fn distinct(self) -> Self {
        self.with_clause(Clause::Distinct)
    }

    /// Render `SELECT COUNT(*)` instead of the rows
    pub fn count_only(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Populate a builder with everything this query needs
    ///
    /// The builder stays available for reading column aliases and
    /// expand-as-array targets after rendering.
    pub fn builder<'a>(&self, database: &'a dyn Database) -> QueryResult<QueryBuilder<'a>> {
        let mut builder = QueryBuilder::new(database, &self.root)?;
        let table = builder.root_table_name().to_string();
        builder.add_from_item(&table);

        if self.count_only {
            builder.set_count_only_flag();
        }

        let select = Clause::extract_select(&self.clauses);
        self.root.put_select_fields(&mut builder, None, select.as_ref())?;

        if let Some(condition) = &self.condition {
            condition
                .update_query_builder(&mut builder)
                .map_err(QueryError::increment_offset)?;
        }

        for clause in &self.clauses {
            clause
                .update_query_builder(&mut builder)
                .map_err(QueryError::increment_offset)?;
        }

        Ok(builder)
    }

    /// Render the statement, keeping named placeholders
    pub fn build(&self, database: &dyn Database) -> QueryResult<SqlText> {
        self.builder(database)?.statement()
    }

    /// Render the statement and bind named values into literal SQL
    pub fn to_sql(&self, database: &dyn Database, values: &NamedValues) -> QueryResult<String> {
        let statement = self.build(database)?;
        database.prepare_statement(&statement, values)
    }
}
