//! Complete statements rendered with the MySQL dialect
//!
//! None of these tests need a running server.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use querytree::prelude::*;

fn person_table() -> TableInfo {
    TableInfo::new("person", "id")
        .with_column("first_name", SqlType::Text)
        .with_column("last_name", SqlType::Text)
}

fn project_table() -> TableInfo {
    TableInfo::new("project", "id")
        .with_column("name", SqlType::Text)
        .with_column("start_date", SqlType::Date)
}

fn lines(parts: &[&str]) -> String {
    parts.join("\n")
}

#[test]
fn test_limit_uses_offset_comma_form() {
    let db = MySqlDialect::new();
    let person = Node::table(person_table()).unwrap();
    let sql = Query::new(&person)
        .with_clause(Limit::new(10, 20))
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        lines(&[
            "SELECT",
            "    `t0`.`id` AS `a0`,",
            "    `t0`.`first_name` AS `a1`,",
            "    `t0`.`last_name` AS `a2`",
            "FROM",
            "    `person` AS `t0`",
            "LIMIT 20,10",
        ])
    );
}

#[test]
fn test_filter_through_association() {
    let db = MySqlDialect::new();
    let person = Node::table(person_table()).unwrap();
    let projects = person
        .association(
            "projects",
            "team_member_project_assn",
            "person_id",
            "project_id",
            project_table(),
        )
        .unwrap();
    let project = projects.child_table_node().unwrap();

    let sql = Query::new(&person)
        .with_condition(Condition::equal(&project.column("name").unwrap(), "Blueman").unwrap())
        .with_clause(
            Select::new([person.column("first_name").unwrap()])
                .unwrap()
                .with_skip_primary_key(true),
        )
        .distinct()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        lines(&[
            "SELECT DISTINCT",
            "    `t0`.`first_name` AS `a0`",
            "FROM",
            "    `person` AS `t0`",
            "    LEFT JOIN `team_member_project_assn` AS `t1` ON `t0`.`id` = `t1`.`person_id`",
            "    LEFT JOIN `project` AS `t2` ON `t1`.`project_id` = `t2`.`id`",
            "WHERE",
            "    `t2`.`name` = 'Blueman'",
        ])
    );
}

#[derive(Serialize)]
struct PersonFilter {
    last_name: String,
    min_id: i64,
}

#[test]
fn test_named_values_from_serializable_struct() {
    let db = MySqlDialect::new();
    let person = Node::table(person_table()).unwrap();
    let query = Query::new(&person).with_condition(
        Condition::and([
            Condition::equal(&person.column("last_name").unwrap(), NamedValue::new("last_name"))
                .unwrap(),
            Condition::greater_or_equal(&person.column("id").unwrap(), NamedValue::new("min_id"))
                .unwrap(),
        ])
        .unwrap(),
    );

    let filter = PersonFilter {
        last_name: "O'Neil".to_string(),
        min_id: 5,
    };
    let sql = query
        .to_sql(&db, &NamedValues::from_serialize(&filter).unwrap())
        .unwrap();
    assert!(sql.ends_with("WHERE\n    (`t0`.`last_name` = 'O\\'Neil' AND `t0`.`id` >= 5)"));
}

#[test]
fn test_json_list_binds_in_operand() {
    let db = MySqlDialect::new();
    let person = Node::table(person_table()).unwrap();
    let query = Query::new(&person)
        .with_condition(Condition::is_in(&person.column("id").unwrap(), NamedValue::new("ids")).unwrap());

    let sql = query
        .to_sql(&db, &NamedValues::new().with("ids", json!([3, 5, 8])))
        .unwrap();
    assert!(sql.ends_with("`t0`.`id` IN (3,5,8)"));

    let empty = Query::new(&person).with_condition(
        Condition::is_in(&person.column("id").unwrap(), Vec::<SqlValue>::new()).unwrap(),
    );
    assert!(empty.to_sql(&db, &NamedValues::new()).unwrap().ends_with("WHERE\n    1=0"));
}

#[test]
fn test_dates_and_count_only() {
    let db = MySqlDialect::new();
    let project = Node::table(project_table()).unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let sql = Query::new(&project)
        .with_condition(Condition::less_than(&project.column("start_date").unwrap(), start).unwrap())
        .count_only()
        .build(&db)
        .unwrap()
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        lines(&[
            "SELECT",
            "    COUNT(*) AS q_row_count",
            "FROM",
            "    `project` AS `t0`",
            "WHERE",
            "    `t0`.`start_date` < '2024-03-01'",
        ])
    );
}

#[test]
fn test_null_equality_never_renders_equals_null() {
    let db = MySqlDialect::new();
    let person = Node::table(person_table()).unwrap();
    let query = Query::new(&person).with_condition(
        Condition::not_equal(&person.column("last_name").unwrap(), NamedValue::new("name")).unwrap(),
    );
    let sql = query
        .to_sql(&db, &NamedValues::new().with("name", SqlValue::Null))
        .unwrap();
    assert!(sql.ends_with("`t0`.`last_name` IS NOT NULL"));
    assert!(!sql.contains("NULL'"));
}
