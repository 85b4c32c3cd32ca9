//! Query nodes
//!
//! A node names something a query can refer to: the root table, a column,
//! a forward or reverse reference, an association through a junction table,
//! or a computed expression. Table-like nodes form a tree; every child is
//! owned by its parent and looked up again by alias and kind, so asking for
//! the same relation twice yields the same node.
//!
//! Children keep a weak link back to their parent. The caller keeps the
//! root alive for as long as descendants are used; a dropped ancestor is
//! reported as a caller error instead of a dangling pointer.

pub mod expression;
pub mod join;
pub mod schema;

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use type_mapping::SqlType;

use crate::errors::{QueryError, QueryResult};
use crate::operand::Operand;
use crate::validation::ValidatedIdentifier;

pub use expression::virtual_alias;
pub use schema::{ColumnInfo, TableInfo};

/// Public classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Root table, or a table reached through a foreign key
    Table,
    /// Rows of another table whose foreign key points back at the parent
    ReverseReference,
    /// Junction table of a many-to-many relation
    Association,
    Column,
    Virtual,
    Function,
    Math,
    SubQueryCount,
    SubQuerySql,
}

pub(crate) enum NodeKind {
    Table {
        table: Rc<TableInfo>,
    },
    ReverseReference {
        table: Rc<TableInfo>,
        foreign_key: String,
    },
    Association {
        junction_table: String,
        parent_key: String,
        child_key: String,
        child_table: Rc<TableInfo>,
    },
    Column,
    Virtual {
        sub_query: Option<Node>,
    },
    Function {
        function: String,
        params: Vec<Operand>,
    },
    Math {
        operation: String,
        params: Vec<Operand>,
    },
    SubQueryCount {
        relation: Node,
    },
    SubQuerySql {
        sql: String,
        nodes: Vec<Node>,
    },
}

pub(crate) struct NodeData {
    name: String,
    alias: RefCell<String>,
    full_alias: OnceCell<String>,
    parent: Option<Weak<NodeData>>,
    property_name: Option<String>,
    sql_type: SqlType,
    kind: NodeKind,
    children: RefCell<HashMap<(String, NodeType), Node>>,
}

/// Shared handle to a query node
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    fn from_parts(
        name: String,
        parent: Option<&Node>,
        property_name: Option<String>,
        sql_type: SqlType,
        kind: NodeKind,
    ) -> Node {
        Node(Rc::new(NodeData {
            alias: RefCell::new(name.clone()),
            name,
            full_alias: OnceCell::new(),
            parent: parent.map(|parent| Rc::downgrade(&parent.0)),
            property_name,
            sql_type,
            kind,
            children: RefCell::new(HashMap::new()),
        }))
    }

    /// Parentless node for computed expressions
    pub(crate) fn expression(name: String, sql_type: SqlType, kind: NodeKind) -> Node {
        Node::from_parts(name, None, None, sql_type, kind)
    }

    /// Root node of a query against `table`
    pub fn table(table: impl Into<Rc<TableInfo>>) -> QueryResult<Node> {
        let table = table.into();
        table.validate()?;
        Ok(Node::from_parts(
            table.name().to_string(),
            None,
            None,
            SqlType::Table,
            NodeKind::Table { table },
        ))
    }

    /// Child column of a table-like node
    pub fn column(&self, name: &str) -> QueryResult<Node> {
        let sql_type = match &self.0.kind {
            NodeKind::Table { table } | NodeKind::ReverseReference { table, .. } => {
                table.column_type(name)
            }
            NodeKind::Association { .. } => SqlType::Integer,
            _ => {
                return Err(QueryError::caller(format!(
                    "Cannot get column \"{}\" from non-table node \"{}\"",
                    name, self.0.name
                )))
            }
        };
        self.add_child(name, None, sql_type, NodeKind::Column)
    }

    /// Table reached through the foreign key column `foreign_key` of this node
    pub fn reference(
        &self,
        foreign_key: &str,
        property_name: &str,
        table: impl Into<Rc<TableInfo>>,
    ) -> QueryResult<Node> {
        self.require_table_like("reference")?;
        let table = table.into();
        table.validate()?;
        self.add_child(
            foreign_key,
            Some(property_name.to_string()),
            SqlType::Table,
            NodeKind::Table { table },
        )
    }

    /// Rows of `table` whose `foreign_key` column points at this node's primary key
    pub fn reverse_reference(
        &self,
        name: &str,
        foreign_key: &str,
        property_name: &str,
        table: impl Into<Rc<TableInfo>>,
    ) -> QueryResult<Node> {
        self.require_table_like("reverse reference")?;
        let table = table.into();
        table.validate()?;
        ValidatedIdentifier::new(foreign_key)?;
        self.add_child(
            name,
            Some(property_name.to_string()),
            SqlType::Table,
            NodeKind::ReverseReference {
                table,
                foreign_key: foreign_key.to_string(),
            },
        )
    }

    /// Many-to-many relation through `junction_table`
    ///
    /// `parent_key` is the junction column pointing at this node, `child_key`
    /// the one pointing at `child_table`.
    pub fn association(
        &self,
        name: &str,
        junction_table: &str,
        parent_key: &str,
        child_key: &str,
        child_table: impl Into<Rc<TableInfo>>,
    ) -> QueryResult<Node> {
        self.require_table_like("association")?;
        let child_table = child_table.into();
        child_table.validate()?;
        ValidatedIdentifier::new(junction_table)?;
        ValidatedIdentifier::new(parent_key)?;
        ValidatedIdentifier::new(child_key)?;
        self.add_child(
            name,
            Some(name.to_string()),
            SqlType::Table,
            NodeKind::Association {
                junction_table: junction_table.to_string(),
                parent_key: parent_key.to_string(),
                child_key: child_key.to_string(),
                child_table,
            },
        )
    }

    /// The far-side table node of an association
    pub fn child_table_node(&self) -> QueryResult<Node> {
        match &self.0.kind {
            NodeKind::Association {
                child_key,
                child_table,
                ..
            } => self.add_child(
                child_key,
                Some(child_table.name().to_string()),
                SqlType::Table,
                NodeKind::Table {
                    table: child_table.clone(),
                },
            ),
            _ => Err(QueryError::caller(format!(
                "Node \"{}\" is not an association",
                self.0.name
            ))),
        }
    }

    /// Column node for the primary key of a table or reverse reference
    pub fn primary_key_node(&self) -> QueryResult<Option<Node>> {
        match &self.0.kind {
            NodeKind::Table { table } | NodeKind::ReverseReference { table, .. } => {
                self.column(table.primary_key()).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn require_table_like(&self, what: &str) -> QueryResult<()> {
        match &self.0.kind {
            NodeKind::Table { .. }
            | NodeKind::ReverseReference { .. }
            | NodeKind::Association { .. } => Ok(()),
            _ => Err(QueryError::caller(format!(
                "Cannot create {} from non-table node \"{}\"",
                what, self.0.name
            ))),
        }
    }

    fn add_child(
        &self,
        name: &str,
        property_name: Option<String>,
        sql_type: SqlType,
        kind: NodeKind,
    ) -> QueryResult<Node> {
        let name = ValidatedIdentifier::new(name)?.into_string();
        let node_type = kind.node_type();

        // Same alias and kind means the same relation
        let key = (name.clone(), node_type);
        let existing = self.0.children.borrow().get(&key).cloned();
        if let Some(existing) = existing {
            if existing.0.name == name {
                return Ok(existing);
            }
        }

        let child = Node::from_parts(name, Some(self), property_name, sql_type, kind);
        self.0.children.borrow_mut().insert(key, child.clone());
        crate::trace_log!("Created {:?} node \"{}\"", node_type, child.0.name);
        Ok(child)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn alias(&self) -> String {
        self.0.alias.borrow().clone()
    }

    pub fn property_name(&self) -> Option<&str> {
        self.0.property_name.as_deref()
    }

    pub fn sql_type(&self) -> SqlType {
        self.0.sql_type
    }

    pub fn node_type(&self) -> NodeType {
        self.0.kind.node_type()
    }

    pub(crate) fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    /// True for the root table node of a query
    pub fn is_root(&self) -> bool {
        matches!(self.0.kind, NodeKind::Table { .. }) && self.0.parent.is_none()
    }

    /// True for computed nodes, which are rooted at themselves
    pub fn is_expression(&self) -> bool {
        matches!(
            self.node_type(),
            NodeType::Virtual
                | NodeType::Function
                | NodeType::Math
                | NodeType::SubQueryCount
                | NodeType::SubQuerySql
        )
    }

    /// True for nodes that render a complete sub-select
    pub fn is_sub_query(&self) -> bool {
        matches!(
            self.node_type(),
            NodeType::SubQueryCount | NodeType::SubQuerySql
        )
    }

    pub fn parent(&self) -> QueryResult<Option<Node>> {
        match &self.0.parent {
            None => Ok(None),
            Some(weak) => weak.upgrade().map(|data| Some(Node(data))).ok_or_else(|| {
                QueryError::caller(format!(
                    "Parent of node \"{}\" is missing; keep the root node alive while using its children",
                    self.0.name
                ))
            }),
        }
    }

    /// Table metadata of tables and reverse references
    pub fn table_info(&self) -> Option<Rc<TableInfo>> {
        match &self.0.kind {
            NodeKind::Table { table } | NodeKind::ReverseReference { table, .. } => {
                Some(table.clone())
            }
            _ => None,
        }
    }

    /// Name of the SQL table this node reads from
    pub fn table_name(&self) -> QueryResult<Option<String>> {
        match &self.0.kind {
            NodeKind::Table { table } | NodeKind::ReverseReference { table, .. } => {
                Ok(Some(table.name().to_string()))
            }
            NodeKind::Association { junction_table, .. } => Ok(Some(junction_table.clone())),
            NodeKind::Column => match self.parent()? {
                Some(parent) => parent.table_name(),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// Key column of a table-like node
    ///
    /// For associations this is the junction column pointing at the parent.
    pub fn primary_key(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Table { table } | NodeKind::ReverseReference { table, .. } => {
                Some(table.primary_key())
            }
            NodeKind::Association { parent_key, .. } => Some(parent_key),
            _ => None,
        }
    }

    /// Alias path from the root, joined with `__`
    ///
    /// The first call fixes the value; the alias of this node and of every
    /// ancestor cannot change afterwards.
    pub fn full_alias(&self) -> QueryResult<String> {
        if let Some(cached) = self.0.full_alias.get() {
            return Ok(cached.clone());
        }
        let alias = self.alias();
        let full = match self.parent()? {
            Some(parent) => format!("{}__{}", parent.full_alias()?, alias),
            None => alias,
        };
        Ok(self.0.full_alias.get_or_init(|| full).clone())
    }

    /// Rename this node so the same relation can be joined more than once
    pub fn set_alias(&self, alias: &str) -> QueryResult<()> {
        if self.0.full_alias.get().is_some() {
            return Err(QueryError::caller(format!(
                "Cannot set alias \"{}\" on node \"{}\" after it has been used in a query",
                alias, self.0.name
            )));
        }
        let alias = ValidatedIdentifier::new(alias)?.into_string();
        if let Some(parent) = self.parent()? {
            let mut siblings = parent.0.children.borrow_mut();
            let new = (alias.clone(), self.node_type());
            if let Some(taken) = siblings.get(&new) {
                if !Rc::ptr_eq(&taken.0, &self.0) {
                    return Err(QueryError::caller(format!(
                        "Alias \"{}\" is already used by sibling node \"{}\"",
                        alias,
                        taken.name()
                    )));
                }
            }
            let old = (self.alias(), self.node_type());
            if siblings
                .get(&old)
                .is_some_and(|sibling| Rc::ptr_eq(&sibling.0, &self.0))
            {
                siblings.remove(&old);
            }
            siblings.insert(new, self.clone());
        }
        *self.0.alias.borrow_mut() = alias;
        Ok(())
    }

    /// Builder-style `set_alias`
    pub fn with_alias(self, alias: &str) -> QueryResult<Node> {
        self.set_alias(alias)?;
        Ok(self)
    }

    /// Full alias of the table this node belongs to
    ///
    /// Columns report their parent; every other node reports itself.
    pub fn table_key(&self) -> QueryResult<String> {
        match &self.0.kind {
            NodeKind::Column => match self.parent()? {
                Some(parent) => parent.full_alias(),
                None => self.full_alias(),
            },
            _ => self.full_alias(),
        }
    }

    /// Reduce a node to something usable as a column value
    ///
    /// Tables stand for their primary key; associations have no single column.
    pub(crate) fn into_column(self, context: &str) -> QueryResult<Node> {
        match &self.0.kind {
            NodeKind::Association { .. } => Err(QueryError::invalid_cast(format!(
                "{} cannot use association node \"{}\"",
                context, self.0.name
            ))),
            NodeKind::Table { .. } | NodeKind::ReverseReference { .. } => {
                match self.primary_key_node()? {
                    Some(pk) => Ok(pk),
                    None => Ok(self),
                }
            }
            _ => Ok(self),
        }
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl NodeKind {
    fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Table { .. } => NodeType::Table,
            NodeKind::ReverseReference { .. } => NodeType::ReverseReference,
            NodeKind::Association { .. } => NodeType::Association,
            NodeKind::Column => NodeType::Column,
            NodeKind::Virtual { .. } => NodeType::Virtual,
            NodeKind::Function { .. } => NodeType::Function,
            NodeKind::Math { .. } => NodeType::Math,
            NodeKind::SubQueryCount { .. } => NodeType::SubQueryCount,
            NodeKind::SubQuerySql { .. } => NodeType::SubQuerySql,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.node_type())
            .field("name", &self.0.name)
            .field("alias", &*self.0.alias.borrow())
            .field("full_alias", &self.0.full_alias.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> TableInfo {
        TableInfo::new("person", "id")
            .with_column("first_name", SqlType::Text)
            .with_column("last_name", SqlType::Text)
    }

    fn project() -> TableInfo {
        TableInfo::new("project", "id")
            .with_column("name", SqlType::Text)
            .with_column("manager_person_id", SqlType::Integer)
    }

    #[test]
    fn test_full_alias_path() {
        let root = Node::table(project()).unwrap();
        let manager = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap();
        let first_name = manager.column("first_name").unwrap();
        assert_eq!(root.full_alias().unwrap(), "project");
        assert_eq!(
            first_name.full_alias().unwrap(),
            "project__manager_person_id__first_name"
        );
        assert_eq!(
            first_name.table_key().unwrap(),
            "project__manager_person_id"
        );
        assert_eq!(first_name.sql_type(), SqlType::Text);
    }

    #[test]
    fn test_children_are_reused() {
        let root = Node::table(project()).unwrap();
        let a = root.column("name").unwrap();
        let b = root.column("name").unwrap();
        assert!(a.ptr_eq(&b));

        // A column and a reference may share the foreign key name
        let fk = root.column("manager_person_id").unwrap();
        let manager = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap();
        assert_eq!(fk.node_type(), NodeType::Column);
        assert_eq!(manager.node_type(), NodeType::Table);
        assert!(fk.ptr_eq(&root.column("manager_person_id").unwrap()));
        assert!(manager.ptr_eq(
            &root
                .reference("manager_person_id", "ManagerPerson", person())
                .unwrap()
        ));
    }

    #[test]
    fn test_alias_locked_after_full_alias() {
        let root = Node::table(project()).unwrap();
        let manager = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap();
        manager.set_alias("boss").unwrap();
        assert_eq!(manager.full_alias().unwrap(), "project__boss");

        let err = manager.set_alias("other").unwrap_err();
        assert!(err.is_caller());
        assert_eq!(manager.alias(), "boss");
    }

    #[test]
    fn test_aliased_relation_joins_separately() {
        let root = Node::table(project()).unwrap();
        let first = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap()
            .with_alias("first")
            .unwrap();
        let second = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap();
        assert!(!first.ptr_eq(&second));
        assert_eq!(second.full_alias().unwrap(), "project__manager_person_id");
    }

    #[test]
    fn test_alias_taken_by_sibling_is_rejected() {
        let root = Node::table(project().with_column("sponsor_person_id", SqlType::Integer)).unwrap();
        let manager = root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap();
        let sponsor = root
            .reference("sponsor_person_id", "SponsorPerson", person())
            .unwrap();

        let err = sponsor.set_alias("manager_person_id").unwrap_err();
        assert!(err.is_caller());
        assert_eq!(sponsor.alias(), "sponsor_person_id");
        assert!(root
            .reference("manager_person_id", "ManagerPerson", person())
            .unwrap()
            .ptr_eq(&manager));

        // Columns live apart from relations, and renaming to the current alias is fine
        sponsor.set_alias("sponsor_person_id").unwrap();
        let column = root.column("name").unwrap();
        assert!(column.set_alias("first_name").is_ok());
        assert!(root.column("manager_person_id").unwrap().set_alias("first_name").unwrap_err().is_caller());
    }

    #[test]
    fn test_set_alias_validates() {
        let root = Node::table(project()).unwrap();
        let name = root.column("name").unwrap();
        assert!(matches!(
            name.set_alias("bad alias"),
            Err(QueryError::Validation(_))
        ));
    }

    #[test]
    fn test_dropped_parent_is_caller_error() {
        let column = {
            let root = Node::table(project()).unwrap();
            root.column("name").unwrap()
        };
        let err = column.full_alias().unwrap_err();
        assert!(err.is_caller());
    }

    #[test]
    fn test_association_child_table() {
        let root = Node::table(person()).unwrap();
        let assn = root
            .association(
                "project_as_team_member",
                "team_member_project_assn",
                "person_id",
                "project_id",
                project(),
            )
            .unwrap();
        assert_eq!(assn.primary_key(), Some("person_id"));
        assert_eq!(
            assn.table_name().unwrap().as_deref(),
            Some("team_member_project_assn")
        );
        let child = assn.child_table_node().unwrap();
        assert_eq!(child.node_type(), NodeType::Table);
        assert_eq!(
            child.full_alias().unwrap(),
            "person__project_as_team_member__project_id"
        );
        assert!(root.child_table_node().unwrap_err().is_caller());
    }

    #[test]
    fn test_into_column() {
        let root = Node::table(person()).unwrap();
        let pk = root.clone().into_column("Select").unwrap();
        assert_eq!(pk.node_type(), NodeType::Column);
        assert_eq!(pk.name(), "id");

        let assn = root
            .association("projects", "team_member_project_assn", "person_id", "project_id", project())
            .unwrap();
        assert!(assn.into_column("Select").unwrap_err().is_invalid_cast());
    }

    #[test]
    fn test_column_on_column_rejected() {
        let root = Node::table(person()).unwrap();
        let name = root.column("first_name").unwrap();
        assert!(name.column("x").unwrap_err().is_caller());
        assert!(name
            .reference("x_id", "X", project())
            .unwrap_err()
            .is_caller());
    }
}
