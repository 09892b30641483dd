//! Integration tests for logical table substitution.

use quarry::rewrite::{substitute_tables, MappingTarget, RewriteError, TableMapping};
use quarry::sql::Dialect;

fn mapping(entries: &[(&str, &str)]) -> TableMapping {
    TableMapping::new(entries.iter().copied(), None).unwrap()
}

#[test]
fn test_file_scan_target() {
    let m = mapping(&[("sales", "read_csv('/data/sales.csv')")]);
    let sql = substitute_tables(
        "SELECT region, sum(amount) FROM sales GROUP BY region",
        &m,
        Dialect::DuckDb,
    )
    .unwrap();
    insta::assert_snapshot!(
        sql,
        @r#"SELECT "region", sum("amount") FROM read_csv('/data/sales.csv') AS "sales" GROUP BY "region""#
    );
}

#[test]
fn test_joined_tables_each_keep_their_alias() {
    let m = mapping(&[("o", "shop.orders"), ("c", "crm.customers")]);
    let sql = substitute_tables(
        "SELECT o.id, cu.name FROM o JOIN c AS cu ON o.customer_id = cu.id",
        &m,
        Dialect::Postgres,
    )
    .unwrap();
    assert!(sql.starts_with(
        "SELECT \"o\".\"id\", \"cu\".\"name\" FROM \"shop\".\"orders\" AS \"o\""
    ));
    assert!(sql.contains(" JOIN \"crm\".\"customers\" AS \"cu\" ON "));
}

#[test]
fn test_references_inside_subqueries_and_ctes() {
    let m = mapping(&[("events", "raw.events_2024")]);
    let sql = substitute_tables(
        "WITH recent AS (SELECT * FROM events WHERE score > 7) \
         SELECT count(*) FROM recent WHERE id IN (SELECT id FROM events)",
        &m,
        Dialect::DuckDb,
    )
    .unwrap();
    assert_eq!(sql.matches("\"raw\".\"events_2024\" AS \"events\"").count(), 2);
    assert!(sql.contains("FROM \"recent\""));
}

#[test]
fn test_tsql_quoting() {
    let m = mapping(&[("orders", "SELECT id, total FROM dbo.orders WHERE total > 0")]);
    let sql = substitute_tables("SELECT * FROM orders AS o", &m, Dialect::TSql).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM (SELECT [id], [total] FROM [dbo].[orders] WHERE [total] > 0) AS [o]"
    );
}

#[test]
fn test_mapping_classifies_targets() {
    let m = mapping(&[("a", "x.y"), ("b", "SELECT 1 AS one")]);
    assert!(matches!(m.get("a"), Some(MappingTarget::Relation(_))));
    assert!(matches!(m.get("b"), Some(MappingTarget::Subquery(_))));
    assert_eq!(m.keys().collect::<Vec<_>>(), ["a", "b"]);
}

#[test]
fn test_non_sql_mapping_value_is_rejected() {
    let err = TableMapping::new([("orders", "not valid sql (")], None).unwrap_err();
    match err {
        RewriteError::InvalidTableMapping { key, value, .. } => {
            assert_eq!(key, "orders");
            assert_eq!(value, "not valid sql (");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_input_parse_error() {
    let m = mapping(&[("a", "b")]);
    assert!(matches!(
        substitute_tables("SELECT * FROM", &m, Dialect::DuckDb),
        Err(RewriteError::Parse { .. })
    ));
}

#[test]
fn test_commented_query_target_on_snowflake() {
    let m = mapping(&[(
        "orders",
        "SELECT id, total FROM sales.orders -- latest load only",
    )]);
    let sql = substitute_tables("SELECT o.id FROM orders AS o", &m, Dialect::Snowflake).unwrap();
    assert_eq!(
        sql,
        "SELECT \"O\".\"ID\" FROM (SELECT \"ID\", \"TOTAL\" FROM \"SALES\".\"ORDERS\") AS \"O\""
    );
}
