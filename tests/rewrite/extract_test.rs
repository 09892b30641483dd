//! Integration tests for table name extraction.

use quarry::rewrite::extract_table_names;
use quarry::sql::Dialect;

#[test]
fn test_cte_scenario() {
    let names = extract_table_names(
        "WITH recent AS (SELECT * FROM orders) \
         SELECT * FROM recent JOIN customers ON recent.customer_id = customers.id",
        Some(Dialect::Postgres),
    )
    .unwrap();
    assert_eq!(names, ["orders", "customers"]);
}

#[test]
fn test_cte_defined_in_another_statement_is_excluded() {
    let names = extract_table_names(
        "SELECT * FROM staging; WITH staging AS (SELECT * FROM raw) SELECT * FROM staging",
        None,
    )
    .unwrap();
    assert_eq!(names, ["raw"]);
}

#[test]
fn test_first_seen_order_with_nested_queries() {
    let names = extract_table_names(
        "SELECT * FROM a WHERE id IN (SELECT a_id FROM b) AND EXISTS (SELECT 1 FROM c)",
        Some(Dialect::DuckDb),
    )
    .unwrap();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn test_duplicate_reference_listed_once() {
    let names = extract_table_names(
        "SELECT * FROM orders WHERE id IN (SELECT id FROM orders)",
        Some(Dialect::Postgres),
    )
    .unwrap();
    assert_eq!(names, ["orders"]);
}

#[test]
fn test_file_scans_are_not_tables() {
    let names = extract_table_names(
        "SELECT * FROM read_parquet('/x.parquet') AS p JOIN dims ON p.k = dims.k",
        Some(Dialect::DuckDb),
    )
    .unwrap();
    assert_eq!(names, ["dims"]);
}

#[test]
fn test_parse_error() {
    assert!(extract_table_names("SELECT * FROM (", None).is_err());
}
