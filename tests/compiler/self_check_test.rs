//! Every compiled statement must parse back under its dialect's grammar,
//! and quoting it again must not change it.

use quarry::compiler::{
    build_head_query, build_query, build_row_count_query, self_check, CompileError,
    CompileOptions, CompiledQuery,
};
use quarry::model::{Column, ColumnType, Connection, Engine, Schema, SchemaSource, Transformation};
use quarry::sql::parse::parse_statements;
use quarry::sql::{Dialect, SqlDialect};
use serde_json::json;

fn customers() -> Schema {
    Schema::builder(
        "customers",
        SchemaSource::relational(Engine::Postgres, Connection::new("db", "crm"), "crm.customers"),
    )
    .column(Column::new("id", ColumnType::Integer))
    .column(Column::new("name", ColumnType::String))
    .column(Column::new("city", ColumnType::String))
    .column(Column::new("balance", ColumnType::Float))
    .column(Column::new("segment", ColumnType::String))
    .transformation(Transformation::new("strip", json!({"column": "name"})).unwrap())
    .transformation(Transformation::new("to_uppercase", json!({"column": "name"})).unwrap())
    .transformation(
        Transformation::new("fill_na", json!({"column": "city", "value": "unknown"})).unwrap(),
    )
    .transformation(
        Transformation::new("round_numbers", json!({"column": "balance", "decimals": 2}))
            .unwrap(),
    )
    .transformation(
        Transformation::new("clip", json!({"column": "balance", "lower": 0, "upper": 1000000}))
            .unwrap(),
    )
    .transformation(
        Transformation::new(
            "map_values",
            json!({"column": "segment", "mapping": {"e": "enterprise", "s": "smb"}}),
        )
        .unwrap(),
    )
    .transformation(
        Transformation::new("rename", json!({"column": "segment", "new_name": "tier"})).unwrap(),
    )
    .order_by(["balance DESC"])
    .limit(50)
    .build()
    .unwrap()
}

fn grouped() -> Schema {
    Schema::builder(
        "city_balances",
        SchemaSource::relational(Engine::Postgres, Connection::new("db", "crm"), "customers"),
    )
    .column(Column::new("city", ColumnType::String))
    .column(
        Column::new("balance", ColumnType::Float)
            .with_expression("sum(balance)")
            .with_alias("total_balance"),
    )
    .group_by(["city"])
    .build()
    .unwrap()
}

fn assert_reparses(compiled: &CompiledQuery) {
    let statements = parse_statements(&compiled.sql, Some(compiled.dialect))
        .unwrap_or_else(|e| panic!("{} does not parse: {}\n{}", compiled.dialect, e, compiled.sql));
    assert_eq!(statements.len(), 1, "{}", compiled.sql);

    let again = self_check(&compiled.sql, compiled.dialect, "test").unwrap();
    assert_eq!(again, compiled.sql, "quoting is not idempotent for {}", compiled.dialect);
}

#[test]
fn test_all_dialects_round_trip() {
    for dialect in Dialect::ALL {
        let options = CompileOptions::default().with_dialect(dialect);
        for schema in [customers(), grouped()] {
            assert_reparses(&build_query(&schema, &options).unwrap());
            assert_reparses(&build_head_query(&schema, &options, Some(3)).unwrap());
            assert_reparses(&build_row_count_query(&schema, &options).unwrap());
        }
    }
}

#[test]
fn test_expression_columns_fold_like_plain_columns() {
    for dialect in Dialect::ALL {
        let ident = |name: &str| dialect.quote_identifier(&dialect.normalize_identifier(name));
        let options = CompileOptions::default().with_dialect(dialect);
        let compiled = build_query(&grouped(), &options).unwrap();
        assert!(
            compiled.sql.contains(&format!("sum({})", ident("balance"))),
            "{}: {}",
            dialect,
            compiled.sql
        );
        assert!(
            compiled.sql.ends_with(&format!("GROUP BY {}", ident("city"))),
            "{}: {}",
            dialect,
            compiled.sql
        );
    }
}

#[test]
fn test_head_never_orders() {
    for dialect in Dialect::ALL {
        let options = CompileOptions::default().with_dialect(dialect);
        let head = build_head_query(&customers(), &options, None).unwrap();
        let upper = head.sql.to_uppercase();
        if dialect == Dialect::TSql {
            assert!(upper.contains("ORDER BY (SELECT NULL)"), "{}", head.sql);
        } else {
            assert!(!upper.contains("ORDER BY"), "{}: {}", dialect, head.sql);
        }
    }
}

#[test]
fn test_unparseable_sql_is_reported_with_schema() {
    let err = self_check("SELECT * FROM", Dialect::Postgres, "orders").unwrap_err();
    match err {
        CompileError::InvalidGeneratedQuery { schema, sql, .. } => {
            assert_eq!(schema, "orders");
            assert_eq!(sql, "SELECT * FROM");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_multiple_statements_fail_self_check() {
    assert!(self_check("SELECT 1; SELECT 2", Dialect::DuckDb, "s").is_err());
}
