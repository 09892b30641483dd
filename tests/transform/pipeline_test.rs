//! Integration tests for the transformation pipeline.

use quarry::model::Transformation;
use quarry::sql::{col, Dialect};
use quarry::transform::{apply, EMAIL_PATTERN};
use serde_json::{json, Value};

fn t(kind: &str, params: Value) -> Transformation {
    Transformation::new(kind, params).unwrap()
}

fn render(column: &str, ts: &[Transformation], dialect: Dialect) -> (String, Option<String>) {
    let out = apply(col(column), column, None, ts, dialect);
    (out.expr.to_sql(dialect), out.alias)
}

#[test]
fn test_chained_string_cleanup() {
    let ts = [
        t("strip", json!({"column": "city"})),
        t("to_uppercase", json!({"column": "city"})),
        t("fill_na", json!({"column": "city", "value": "UNKNOWN"})),
    ];
    let (sql, alias) = render("city", &ts, Dialect::DuckDb);
    assert_eq!(sql, "COALESCE(UPPER(TRIM(\"city\")), 'UNKNOWN')");
    assert_eq!(alias.as_deref(), Some("city"));
}

#[test]
fn test_other_columns_are_ignored() {
    let ts = [t("to_lowercase", json!({"column": "email"}))];
    let (sql, alias) = render("name", &ts, Dialect::Postgres);
    assert_eq!(sql, "\"name\"");
    assert_eq!(alias, None);
}

#[test]
fn test_targets_match_case_insensitively() {
    let ts = [t("strip", json!({"column": "NAME"}))];
    let (sql, _) = render("name", &ts, Dialect::Postgres);
    assert_eq!(sql, "TRIM(\"name\")");
}

#[test]
fn test_round_then_scale() {
    let ts = [
        t("round_numbers", json!({"column": "price", "decimals": 2})),
        t("scale", json!({"column": "price", "factor": 100})),
    ];
    let (sql, _) = render("price", &ts, Dialect::DuckDb);
    assert_eq!(sql, "(ROUND(\"price\", 2) * 100)");
}

#[test]
fn test_map_values_keeps_unmapped() {
    let ts = [t(
        "map_values",
        json!({"column": "status", "mapping": {"A": "active", "I": "inactive"}}),
    )];
    let (sql, _) = render("status", &ts, Dialect::DuckDb);
    assert_eq!(
        sql,
        "CASE WHEN \"status\" = 'A' THEN 'active' WHEN \"status\" = 'I' THEN 'inactive' ELSE \"status\" END"
    );
}

#[test]
fn test_validate_email_nulls_invalid_values() {
    let ts = [t("validate_email", json!({"column": "email"}))];
    let (sql, _) = render("email", &ts, Dialect::DuckDb);
    assert!(sql.starts_with("CASE WHEN "));
    assert!(sql.contains(EMAIL_PATTERN));
    assert!(sql.ends_with("THEN \"email\" ELSE NULL END"));
}

#[test]
fn test_rename_sets_alias_without_rewriting() {
    let ts = [
        t("rename", json!({"column": "amt", "new_name": "amount"})),
        t("ensure_positive", json!({"column": "amt"})),
    ];
    let (sql, alias) = render("amt", &ts, Dialect::DuckDb);
    assert_eq!(sql, "ABS(\"amt\")");
    assert_eq!(alias.as_deref(), Some("amount"));
}

#[test]
fn test_dialect_specific_rewrites() {
    let ts = [t("anonymize", json!({"column": "ssn"}))];
    let (duck, _) = render("ssn", &ts, Dialect::DuckDb);
    let (oracle, alias) = render("ssn", &ts, Dialect::Oracle);
    assert_eq!(duck, "MD5(CAST(\"ssn\" AS TEXT))");
    assert!(oracle.starts_with("STANDARD_HASH(CAST(\"ssn\""));
    assert_eq!(alias.as_deref(), Some("SSN"));
}
