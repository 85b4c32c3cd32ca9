//! Complete statements rendered through `Query`

use crate::clause::{Aggregate, Expand, GroupBy, Having, Limit, OrderBy, OrderItem, Select};
use crate::condition::Condition;
use crate::database::StandardDialect;
use crate::errors::QueryError;
use crate::named::{NamedValue, NamedValues};
use crate::node::{Node, TableInfo};
use crate::query::Query;
use type_mapping::{SqlType, SqlValue};

fn person() -> Node {
    Node::table(
        TableInfo::new("person", "id")
            .with_column("first_name", SqlType::Text)
            .with_column("last_name", SqlType::Text),
    )
    .unwrap()
}

fn project() -> Node {
    Node::table(project_table()).unwrap()
}

fn project_table() -> TableInfo {
    TableInfo::new("project", "id")
        .with_column("name", SqlType::Text)
        .with_column("manager_person_id", SqlType::Integer)
        .with_column("budget", SqlType::Float)
}

#[test]
fn test_simple_select() {
    let db = StandardDialect::new();
    let root = person();
    let query = Query::new(&root)
        .with_condition(Condition::equal(&root.column("first_name").unwrap(), "Ben").unwrap());
    let sql = query.build(&db).unwrap().to_sql().unwrap();
    assert_eq!(
        sql,
        "SELECT\n    \"t0\".\"id\" AS \"a0\",\n    \"t0\".\"first_name\" AS \"a1\",\n    \"t0\".\"last_name\" AS \"a2\"\nFROM\n    \"person\" AS \"t0\"\nWHERE\n    \"t0\".\"first_name\" = 'Ben'"
    );
}

#[test]
fn test_always_true_condition_has_no_where() {
    let db = StandardDialect::new();
    let root = person();
    let sql = Query::new(&root)
        .with_condition(Condition::all())
        .build(&db)
        .unwrap()
        .to_string();
    assert!(!sql.contains("WHERE"));
}

#[test]
fn test_expand_order_and_limit() {
    let db = StandardDialect::new();
    let root = project();
    let manager = root
        .reference(
            "manager_person_id",
            "ManagerPerson",
            TableInfo::new("person", "id")
                .with_column("first_name", SqlType::Text)
                .with_column("last_name", SqlType::Text),
        )
        .unwrap();
    let query = Query::new(&root)
        .with_clause(Expand::new(&manager).unwrap())
        .with_clause(
            OrderBy::new(vec![
                OrderItem::from(manager.column("last_name").unwrap()),
                OrderItem::from("desc"),
            ])
            .unwrap(),
        )
        .with_clause(Limit::new(10, 20));

    let builder = query.builder(&db).unwrap();
    assert_eq!(
        builder
            .column_aliases()
            .get("project__manager_person_id__last_name")
            .map(String::as_str),
        Some("a6")
    );
    assert_eq!(builder.limit_info(), Some("20,10"));

    let sql = builder.statement().unwrap().to_sql().unwrap();
    let expected = [
        "SELECT",
        "    \"t0\".\"id\" AS \"a0\",",
        "    \"t0\".\"name\" AS \"a1\",",
        "    \"t0\".\"manager_person_id\" AS \"a2\",",
        "    \"t0\".\"budget\" AS \"a3\",",
        "    \"t1\".\"id\" AS \"a4\",",
        "    \"t1\".\"first_name\" AS \"a5\",",
        "    \"t1\".\"last_name\" AS \"a6\"",
        "FROM",
        "    \"project\" AS \"t0\"",
        "    LEFT JOIN \"person\" AS \"t1\" ON \"t0\".\"manager_person_id\" = \"t1\".\"id\"",
        "ORDER BY",
        "    \"t1\".\"last_name\" DESC",
        "LIMIT 10 OFFSET 20",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_reverse_reference_filter_with_distinct() {
    let db = StandardDialect::new();
    let root = project();
    let milestones = root
        .reverse_reference(
            "milestones",
            "project_id",
            "Milestones",
            TableInfo::new("milestone", "id").with_column("name", SqlType::Text),
        )
        .unwrap();
    let sql = Query::new(&root)
        .with_condition(Condition::like(&milestones.column("name").unwrap(), "Beta%").unwrap())
        .with_clause(
            Select::new([root.column("name").unwrap()])
                .unwrap()
                .with_skip_primary_key(true),
        )
        .distinct()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    let expected = [
        "SELECT DISTINCT",
        "    \"t0\".\"name\" AS \"a0\"",
        "FROM",
        "    \"project\" AS \"t0\"",
        "    LEFT JOIN \"milestone\" AS \"t1\" ON \"t0\".\"id\" = \"t1\".\"project_id\"",
        "WHERE",
        "    \"t1\".\"name\" LIKE 'Beta%'",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_count_only() {
    let db = StandardDialect::new();
    let root = person();
    let sql = Query::new(&root)
        .with_condition(Condition::equal(&root.column("last_name").unwrap(), "Smith").unwrap())
        .count_only()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "SELECT\n    COUNT(*) AS q_row_count\nFROM\n    \"person\" AS \"t0\"\nWHERE\n    \"t0\".\"last_name\" = 'Smith'"
    );
}

#[test]
fn test_count_only_distinct_wraps_select() {
    let db = StandardDialect::new();
    let root = person();
    let sql = Query::new(&root)
        .with_clause(
            Select::new([root.column("first_name").unwrap()])
                .unwrap()
                .with_skip_primary_key(true),
        )
        .distinct()
        .count_only()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    let expected = [
        "SELECT",
        "    COUNT(*) AS q_row_count",
        "FROM (SELECT DISTINCT",
        "    \"t0\".\"first_name\" AS \"a0\"",
        "FROM",
        "    \"person\" AS \"t0\"",
        ") AS q_count_table",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_count_only_grouped_counts_groups() {
    let db = StandardDialect::new();
    let root = person();
    let last_name = root.column("last_name").unwrap();
    let sql = Query::new(&root)
        .with_clause(GroupBy::single(last_name.clone()).unwrap())
        .with_clause(OrderBy::new(vec![OrderItem::from(last_name)]).unwrap())
        .count_only()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    let expected = [
        "SELECT",
        "    COUNT(*) AS q_row_count",
        "FROM (SELECT",
        "    \"t0\".\"last_name\"",
        "FROM",
        "    \"person\" AS \"t0\"",
        "GROUP BY",
        "    \"t0\".\"last_name\"",
        ") AS q_count_table",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_aggregate_group_having_order() {
    let db = StandardDialect::new();
    let root = project();
    let manager_id = root.column("manager_person_id").unwrap();
    let total = Node::virtual_node("total_budget", None).unwrap();
    let sql = Query::new(&root)
        .with_clause(
            Select::new([manager_id.clone()])
                .unwrap()
                .with_skip_primary_key(true),
        )
        .with_clause(Aggregate::sum(&root.column("budget").unwrap(), "Total Budget").unwrap())
        .with_clause(GroupBy::single(manager_id).unwrap())
        .with_clause(Having::condition(
            Condition::greater_than(&total, 1000).unwrap(),
        ))
        .with_clause(OrderBy::new(vec![OrderItem::from(&total), OrderItem::null()]).unwrap())
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    let expected = [
        "SELECT",
        "    \"t0\".\"manager_person_id\" AS \"a0\",",
        "    SUM(\"t0\".\"budget\") AS \"__total_budget\"",
        "FROM",
        "    \"project\" AS \"t0\"",
        "GROUP BY",
        "    \"t0\".\"manager_person_id\"",
        "HAVING",
        "    SUM(\"t0\".\"budget\") > 1000",
        "ORDER BY",
        "    __total_budget DESC",
    ]
    .join("\n");
    assert_eq!(sql, expected);
}

#[test]
fn test_named_values_bound_at_execution() {
    let db = StandardDialect::new();
    let root = person();
    let condition = Condition::and([
        Condition::equal(&root.column("first_name").unwrap(), NamedValue::new("name")).unwrap(),
        Condition::is_in(&root.column("id").unwrap(), NamedValue::new("ids")).unwrap(),
    ])
    .unwrap();
    let query = Query::new(&root).with_condition(condition);

    let statement = query.build(&db).unwrap();
    assert_eq!(statement.placeholder_names(), vec!["name", "ids"]);
    assert!(matches!(
        statement.to_sql(),
        Err(QueryError::UnboundParameter(name)) if name == "name"
    ));

    let bound = query
        .to_sql(&db, &NamedValues::new().with("name", "Ben").with("ids", vec![1, 2]))
        .unwrap();
    assert!(bound.ends_with("(\"t0\".\"first_name\" = 'Ben' AND \"t0\".\"id\" IN (1,2))"));

    let null_name = query
        .to_sql(
            &db,
            &NamedValues::new().with("name", SqlValue::Null).with("ids", vec![7]),
        )
        .unwrap();
    assert!(null_name.contains("\"t0\".\"first_name\" IS NULL"));

    let missing = query.to_sql(&db, &NamedValues::new().with("name", "Ben"));
    assert_eq!(missing, Err(QueryError::UnboundParameter("ids".to_string())));
}

#[test]
fn test_named_list_bound_empty() {
    let db = StandardDialect::new();
    let root = person();
    let id = root.column("id").unwrap();

    let excluded = Query::new(&root)
        .with_condition(Condition::not_in(&id, NamedValue::new("ids")).unwrap());
    let empty = NamedValues::new().with("ids", Vec::<i64>::new());
    assert!(excluded.to_sql(&db, &empty).unwrap().ends_with("WHERE\n    1=1"));
    assert!(excluded
        .to_sql(&db, &NamedValues::new().with("ids", vec![4, 5]))
        .unwrap()
        .ends_with("WHERE\n    \"t0\".\"id\" NOT IN (4,5)"));

    let included = Query::new(&root)
        .with_condition(Condition::is_in(&id, NamedValue::new("ids")).unwrap());
    assert!(included.to_sql(&db, &empty).unwrap().ends_with("WHERE\n    1=0"));
}

#[test]
fn test_same_condition_tree_reused_across_builds() {
    let db = StandardDialect::new();
    let root = person();
    let query = Query::new(&root)
        .with_condition(Condition::is_not_null(&root.column("last_name").unwrap()).unwrap());
    let first = query.build(&db).unwrap();
    let second = query.build(&db).unwrap();
    assert_eq!(first, second);
    assert!(first.to_string().contains("IS NOT NULL"));
}

#[test]
fn test_errors_bubble_with_offset() {
    let db = StandardDialect::new();
    let root = person();
    let stranger = project();
    let query = Query::new(&root).with_condition(
        Condition::equal(&stranger.column("name").unwrap(), "x").unwrap(),
    );
    let err = query.build(&db).unwrap_err();
    assert!(err.is_caller());
    assert!(err.offset().unwrap() >= 3);
}
