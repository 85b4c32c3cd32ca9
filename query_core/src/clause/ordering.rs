//! ORDER BY

use crate::condition::Condition;
use crate::errors::{QueryError, QueryResult};
use crate::named::SqlText;
use crate::node::{Node, NodeKind, NodeType};
use crate::query_builder::QueryBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Direction marker following an ordering key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMarker {
    Flag(bool),
    Text(String),
    Null,
}

impl SortMarker {
    /// `null`, `false` and `"desc"` sort descending, anything else ascending
    pub fn sort_order(&self) -> SortOrder {
        match self {
            SortMarker::Null | SortMarker::Flag(false) => SortOrder::Desc,
            SortMarker::Text(text) if text.trim().eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// One argument of an ORDER BY list
#[derive(Debug, Clone)]
pub enum OrderItem {
    Node(Node),
    Condition(Condition),
    Direction(SortMarker),
}

impl OrderItem {
    pub fn null() -> Self {
        OrderItem::Direction(SortMarker::Null)
    }
}

impl From<Node> for OrderItem {
    fn from(node: Node) -> Self {
        OrderItem::Node(node)
    }
}

impl From<&Node> for OrderItem {
    fn from(node: &Node) -> Self {
        OrderItem::Node(node.clone())
    }
}

impl From<Condition> for OrderItem {
    fn from(condition: Condition) -> Self {
        OrderItem::Condition(condition)
    }
}

impl From<bool> for OrderItem {
    fn from(flag: bool) -> Self {
        OrderItem::Direction(SortMarker::Flag(flag))
    }
}

impl From<&str> for OrderItem {
    fn from(text: &str) -> Self {
        OrderItem::Direction(SortMarker::Text(text.to_string()))
    }
}

impl From<String> for OrderItem {
    fn from(text: String) -> Self {
        OrderItem::Direction(SortMarker::Text(text))
    }
}

impl From<SortOrder> for OrderItem {
    fn from(order: SortOrder) -> Self {
        OrderItem::Direction(SortMarker::Text(order.to_sql().to_string()))
    }
}

#[derive(Debug, Clone)]
enum OrderTarget {
    Node(Node),
    Condition(Condition),
}

#[derive(Debug, Clone)]
struct OrderEntry {
    target: OrderTarget,
    direction: Option<SortOrder>,
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    entries: Vec<OrderEntry>,
}

impl OrderBy {
    /// Keys, each optionally followed by a direction marker
    pub fn new<I>(items: I) -> QueryResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<OrderItem>,
    {
        let mut entries: Vec<OrderEntry> = Vec::new();
        for item in items {
            match item.into() {
                OrderItem::Node(node) => entries.push(OrderEntry {
                    target: OrderTarget::Node(order_node(node)?),
                    direction: None,
                }),
                OrderItem::Condition(condition) => entries.push(OrderEntry {
                    target: OrderTarget::Condition(condition),
                    direction: None,
                }),
                OrderItem::Direction(marker) => match entries.last_mut() {
                    Some(entry) if entry.direction.is_none() => {
                        entry.direction = Some(marker.sort_order())
                    }
                    _ => {
                        return Err(QueryError::caller(
                            "OrderBy direction markers must follow a node or condition",
                        ))
                    }
                },
            }
        }
        if entries.is_empty() {
            return Err(QueryError::caller("No parameters passed in to OrderBy clause"));
        }
        Ok(Self { entries })
    }

    /// Explicit direction of each key, `None` for the database default
    pub fn directions(&self) -> Vec<Option<SortOrder>> {
        self.entries.iter().map(|entry| entry.direction).collect()
    }

    /// Render the comma-separated key list
    pub fn order_by_clause(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<SqlText> {
        let mut items = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let mut item = match &entry.target {
                OrderTarget::Node(node) if node.node_type() == NodeType::Virtual => {
                    if !builder.has_virtual_node(node.name()) {
                        return Err(QueryError::caller(format!(
                            "Virtual node \"{}\" must be expanded or aggregated before it can be ordered by",
                            node.name()
                        )));
                    }
                    SqlText::sql(format!("__{}", node.name()))
                }
                OrderTarget::Node(node) => SqlText::sql(node.column_alias(builder)?),
                OrderTarget::Condition(condition) => condition
                    .where_clause(builder, false)?
                    .unwrap_or_default(),
            };
            if let Some(direction) = entry.direction {
                item.push_str(" ");
                item.push_str(direction.to_sql());
            }
            items.push(item);
        }
        Ok(SqlText::join(items, ", "))
    }

    pub fn update_query_builder(&self, builder: &mut QueryBuilder<'_>) -> QueryResult<()> {
        let sql = self.order_by_clause(builder)?;
        builder.add_order_by_item(sql);
        Ok(())
    }
}

fn order_node(node: Node) -> QueryResult<Node> {
    match node.kind() {
        NodeKind::Association { .. } => Err(QueryError::caller(format!(
            "OrderBy cannot use association node \"{}\"",
            node.name()
        ))),
        NodeKind::Virtual {
            sub_query: Some(_),
        } => Err(QueryError::caller(format!(
            "Virtual node \"{}\" in OrderBy cannot carry its own sub-query",
            node.name()
        ))),
        _ => node.into_column("OrderBy"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StandardDialect;
    use crate::node::TableInfo;
    use type_mapping::SqlType;

    fn person() -> Node {
        Node::table(
            TableInfo::new("person", "id")
                .with_column("first_name", SqlType::Text)
                .with_column("last_name", SqlType::Text)
                .with_column("age", SqlType::Integer),
        )
        .unwrap()
    }

    #[test]
    fn test_direction_markers() {
        assert_eq!(SortMarker::Null.sort_order(), SortOrder::Desc);
        assert_eq!(SortMarker::Flag(false).sort_order(), SortOrder::Desc);
        assert_eq!(SortMarker::Flag(true).sort_order(), SortOrder::Asc);
        assert_eq!(SortMarker::Text(" DeSc ".into()).sort_order(), SortOrder::Desc);
        assert_eq!(SortMarker::Text("asc".into()).sort_order(), SortOrder::Asc);
        assert_eq!(SortMarker::Text("down".into()).sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_pairwise_parsing() {
        let root = person();
        let order = OrderBy::new(vec![
            OrderItem::from(root.column("first_name").unwrap()),
            OrderItem::from(root.column("last_name").unwrap()),
            OrderItem::from("desc"),
            OrderItem::from(root.column("age").unwrap()),
        ])
        .unwrap();
        assert_eq!(
            order.directions(),
            vec![None, Some(SortOrder::Desc), None]
        );

        let db = StandardDialect::new();
        let mut builder = QueryBuilder::new(&db, &root).unwrap();
        assert_eq!(
            order.order_by_clause(&mut builder).unwrap().to_string(),
            "\"t0\".\"first_name\", \"t0\".\"last_name\" DESC, \"t0\".\"age\""
        );
    }

    #[test]
    fn test_marker_without_key() {
        let root = person();
        assert!(OrderBy::new(vec![OrderItem::from(false)]).unwrap_err().is_caller());
        let twice = OrderBy::new(vec![
            OrderItem::from(root.column("age").unwrap()),
            OrderItem::from(true),
            OrderItem::null(),
        ]);
        assert!(twice.unwrap_err().is_caller());
        assert!(OrderBy::new(Vec::<OrderItem>::new()).unwrap_err().is_caller());
    }

    #[test]
    fn test_virtual_nodes() {
        let root = person();
        let with_sub = Node::virtual_node(
            "upper_name",
            Some(Node::function("UPPER", vec![root.column("first_name").unwrap().into()]).unwrap()),
        )
        .unwrap();
        assert!(OrderBy::new([with_sub]).unwrap_err().is_caller());

        let reference = Node::virtual_node("Total", None).unwrap();
        let order = OrderBy::new(vec![OrderItem::from(reference), OrderItem::null()]).unwrap();
        let db = StandardDialect::new();
        let mut builder = QueryBuilder::new(&db, &root).unwrap();
        assert!(order.order_by_clause(&mut builder).unwrap_err().is_caller());

        builder.set_virtual_node("total", Node::function("COUNT", vec![root.clone().into()]).unwrap());
        assert_eq!(
            order.order_by_clause(&mut builder).unwrap().to_string(),
            "__total DESC"
        );
    }

    #[test]
    fn test_condition_key() {
        let root = person();
        let age = root.column("age").unwrap();
        let order = OrderBy::new(vec![
            OrderItem::from(Condition::is_null(&age).unwrap()),
            OrderItem::from(SortOrder::Asc),
        ])
        .unwrap();
        let db = StandardDialect::new();
        let mut builder = QueryBuilder::new(&db, &root).unwrap();
        assert_eq!(
            order.order_by_clause(&mut builder).unwrap().to_string(),
            "\"t0\".\"age\" IS NULL ASC"
        );
    }

    #[test]
    fn test_table_node_orders_by_primary_key() {
        let root = person();
        let order = OrderBy::new([root.clone()]).unwrap();
        let db = StandardDialect::new();
        let mut builder = QueryBuilder::new(&db, &root).unwrap();
        assert_eq!(
            order.order_by_clause(&mut builder).unwrap().to_string(),
            "\"t0\".\"id\""
        );
    }
}
