//! Integration tests for dialect transpilation.

use quarry::rewrite::{transpile, RewriteError};
use quarry::sql::Dialect;

#[test]
fn test_placeholder_scenario() {
    let sql = transpile("SELECT * FROM t WHERE id = %s", Dialect::DuckDb, None).unwrap();
    insta::assert_snapshot!(sql, @"SELECT * FROM t WHERE id = ?");
}

#[test]
fn test_placeholders_follow_target_convention() {
    let source = "UPDATE accounts SET balance = %s WHERE id = %s";
    for dialect in Dialect::ALL {
        let out = transpile(source, dialect, Some(Dialect::Postgres)).unwrap();
        let expected = if dialect == Dialect::DuckDb { "?" } else { "%s" };
        assert_eq!(out.matches(expected).count(), 2, "{dialect}: {out}");
        assert!(!out.contains("___PLACEHOLDER___"));
    }
}

#[test]
fn test_function_remapping_between_dialects() {
    let out = transpile(
        "SELECT IFNULL(name, 'n/a') FROM people",
        Dialect::Postgres,
        Some(Dialect::MySql),
    )
    .unwrap();
    assert_eq!(out, "SELECT COALESCE(name, 'n/a') FROM people");
}

#[test]
fn test_backticks_to_brackets() {
    let out = transpile(
        "SELECT `order id` FROM `sales`",
        Dialect::TSql,
        Some(Dialect::MySql),
    )
    .unwrap();
    assert_eq!(out, "SELECT [order id] FROM [sales]");
}

#[test]
fn test_booleans_stay_literal_for_postgres() {
    let out = transpile("SELECT * FROM t WHERE flag = TRUE", Dialect::Postgres, None).unwrap();
    assert_eq!(out, "SELECT * FROM t WHERE flag = true");
}

#[test]
fn test_multiple_statements_rejected() {
    assert_eq!(
        transpile("SELECT 1; SELECT 2", Dialect::DuckDb, None),
        Err(RewriteError::MultipleStatements(2))
    );
}
