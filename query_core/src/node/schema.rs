//! Table metadata carried by table-like nodes

use type_mapping::SqlType;

use crate::errors::QueryResult;
use crate::validation::ValidatedIdentifier;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: SqlType,
}

/// Name, primary key and ordered column list of a table
///
/// The primary key is always the first column; declaring it again with
/// `with_column` only updates its type.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    name: String,
    primary_key: String,
    columns: Vec<ColumnInfo>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        let primary_key = primary_key.into();
        Self {
            name: name.into(),
            columns: vec![ColumnInfo {
                name: primary_key.clone(),
                sql_type: SqlType::Integer,
            }],
            primary_key,
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(existing) => existing.sql_type = sql_type,
            None => self.columns.push(ColumnInfo { name, sql_type }),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_type(&self, name: &str) -> SqlType {
        self.column(name)
            .map(|column| column.sql_type)
            .unwrap_or_default()
    }

    /// Check every identifier before it is used to build nodes
    pub fn validate(&self) -> QueryResult<()> {
        ValidatedIdentifier::new(&self.name)?;
        for column in &self.columns {
            ValidatedIdentifier::new(&column.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryError;

    #[test]
    fn test_primary_key_is_first_column() {
        let table = TableInfo::new("person", "id")
            .with_column("first_name", SqlType::Text)
            .with_column("id", SqlType::Integer);
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "first_name"]);
        assert_eq!(table.column_type("first_name"), SqlType::Text);
        assert_eq!(table.column_type("unknown"), SqlType::Text);
    }

    #[test]
    fn test_validate_rejects_bad_column() {
        let table = TableInfo::new("person", "id").with_column("bad name", SqlType::Text);
        assert!(matches!(table.validate(), Err(QueryError::Validation(_))));
    }
}
