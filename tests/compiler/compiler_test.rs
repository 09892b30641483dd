//! Integration tests for schema → SQL compilation.

use quarry::compiler::{
    build_head_query, build_query, build_row_count_query, CompileError, CompileOptions,
};
use quarry::model::{
    Column, ColumnType, Connection, Engine, FileFormat, Relation, Schema, SchemaSource,
    Transformation,
};
use quarry::sql::Dialect;
use serde_json::json;

fn options() -> CompileOptions {
    CompileOptions::default().with_dataset_root("/data")
}

fn sales() -> Schema {
    Schema::builder("sales", SchemaSource::file(FileFormat::Csv, "sales/sales.csv"))
        .column(
            Column::new("amount", ColumnType::Float)
                .with_expression("sum(amount)")
                .with_alias("total"),
        )
        .group_by(["region"])
        .build()
        .unwrap()
}

fn orders_file() -> Schema {
    Schema::builder("orders", SchemaSource::file(FileFormat::Parquet, "orders.parquet"))
        .column(Column::new("id", ColumnType::Integer))
        .column(Column::new("amount", ColumnType::Float))
        .order_by(["amount DESC"])
        .limit(100)
        .build()
        .unwrap()
}

fn orders_table(engine: Engine, table: &str) -> Schema {
    Schema::builder(
        "orders",
        SchemaSource::relational(engine, Connection::new("db", "shop"), table),
    )
    .column(Column::new("id", ColumnType::Integer))
    .column(Column::new("email", ColumnType::String))
    .transformation(Transformation::new("to_lowercase", json!({"column": "email"})).unwrap())
    .build()
    .unwrap()
}

// ============================================================================
// File sources
// ============================================================================

#[test]
#[cfg(unix)]
fn test_sales_scenario() {
    let compiled = build_query(&sales(), &options()).unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT sum("amount") AS "total" FROM read_csv('/data/sales/sales.csv') GROUP BY "region""#
    );
}

#[test]
#[cfg(unix)]
fn test_full_query_orders_and_limits() {
    let compiled = build_query(&orders_file(), &options()).unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT "id", "amount" FROM read_parquet('/data/orders.parquet') ORDER BY "amount" DESC LIMIT 100"#
    );
}

#[test]
#[cfg(unix)]
fn test_head_query_drops_order_and_user_limit() {
    let compiled = build_head_query(&orders_file(), &options(), None).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT \"id\", \"amount\" FROM read_parquet('/data/orders.parquet') LIMIT 5"
    );

    let compiled = build_head_query(&orders_file(), &options(), Some(20)).unwrap();
    assert!(compiled.sql.ends_with("LIMIT 20"));
    assert!(!compiled.sql.contains("ORDER BY"));
}

#[test]
#[cfg(unix)]
fn test_row_count_of_plain_schema() {
    let compiled = build_row_count_query(&orders_file(), &options()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT COUNT(*) FROM read_parquet('/data/orders.parquet')"
    );
}

#[test]
#[cfg(unix)]
fn test_row_count_of_grouped_schema_wraps_projection() {
    let compiled = build_row_count_query(&sales(), &options()).unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT COUNT(*) FROM (SELECT sum("amount") AS "total" FROM read_csv('/data/sales/sales.csv') GROUP BY "region") AS "sales""#
    );
}

#[test]
#[cfg(unix)]
fn test_empty_columns_select_star() {
    let schema = Schema::builder("raw", SchemaSource::file(FileFormat::Parquet, "./raw/../raw.parquet"))
        .build()
        .unwrap();
    let compiled = build_query(&schema, &options()).unwrap();
    assert_eq!(compiled.sql, "SELECT * FROM read_parquet('/data/raw.parquet')");
}

#[test]
#[cfg(unix)]
fn test_remove_duplicates_emits_distinct() {
    let schema = Schema::builder("customers", SchemaSource::file(FileFormat::Csv, "c.csv"))
        .column(Column::new("email", ColumnType::String))
        .transformation(Transformation::new("remove_duplicates", json!({})).unwrap())
        .build()
        .unwrap();

    let full = build_query(&schema, &options()).unwrap();
    assert_eq!(
        full.sql,
        "SELECT DISTINCT \"email\" FROM read_csv('/data/c.csv')"
    );

    let count = build_row_count_query(&schema, &options()).unwrap();
    assert!(count.sql.starts_with("SELECT COUNT(*) FROM (SELECT DISTINCT"));
}

#[test]
#[cfg(unix)]
fn test_compound_expression_is_parenthesized() {
    let schema = Schema::builder("orders", SchemaSource::file(FileFormat::Parquet, "o.parquet"))
        .column(Column::new("net", ColumnType::Float).with_expression("amount - discount"))
        .build()
        .unwrap();
    let compiled = build_query(&schema, &options()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT (\"amount\" - \"discount\") AS \"net\" FROM read_parquet('/data/o.parquet')"
    );
}

#[test]
fn test_file_source_rejected_without_file_scan() {
    let err = build_query(&sales(), &options().with_dialect(Dialect::Snowflake)).unwrap_err();
    match err {
        CompileError::UnsupportedSourceFormat {
            schema,
            format,
            dialect,
        } => {
            assert_eq!(schema, "sales");
            assert_eq!(format, "csv");
            assert_eq!(dialect, Dialect::Snowflake);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Relational sources
// ============================================================================

#[test]
fn test_relational_source_uses_engine_dialect() {
    let compiled = build_query(&orders_table(Engine::MySql, "customers"), &options()).unwrap();
    assert_eq!(compiled.dialect, Dialect::MySql);
    assert_eq!(
        compiled.sql,
        "SELECT `id`, LOWER(`email`) AS `email` FROM `customers`"
    );
}

#[test]
fn test_explicit_dialect_overrides_engine() {
    let compiled = build_query(
        &orders_table(Engine::MySql, "customers"),
        &options().with_dialect(Dialect::Postgres),
    )
    .unwrap();
    assert_eq!(compiled.dialect, Dialect::Postgres);
    assert!(compiled.sql.contains("LOWER(\"email\") AS \"email\""));
}

#[test]
fn test_tsql_head_uses_offset_fetch() {
    let compiled =
        build_head_query(&orders_table(Engine::SqlServer, "dbo.orders"), &options(), None)
            .unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @"SELECT [id], LOWER([email]) AS [email] FROM [dbo].[orders] ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH FIRST 5 ROWS ONLY"
    );
}

#[test]
fn test_snowflake_identifiers_are_upper_case() {
    let compiled = build_query(
        &orders_table(Engine::Postgres, "analytics.orders"),
        &options().with_dialect(Dialect::Snowflake),
    )
    .unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT \"ID\", LOWER(\"EMAIL\") AS \"EMAIL\" FROM \"ANALYTICS\".\"ORDERS\""
    );
}

#[test]
fn test_connection_schema_qualifies_table() {
    let mut connection = Connection::new("db", "shop");
    connection.schema = Some("sales".into());
    let schema = Schema::builder(
        "orders",
        SchemaSource::relational(Engine::Postgres, connection, "orders"),
    )
    .build()
    .unwrap();
    let compiled = build_query(&schema, &options()).unwrap();
    assert_eq!(compiled.sql, "SELECT * FROM \"sales\".\"orders\"");
}

#[test]
fn test_oracle_limit_uses_fetch_first() {
    let schema = Schema::builder(
        "orders",
        SchemaSource::relational(Engine::Oracle, Connection::new("db", "orcl"), "orders"),
    )
    .limit(10)
    .build()
    .unwrap();
    let compiled = build_query(&schema, &options()).unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT * FROM \"ORDERS\" FETCH FIRST 10 ROWS ONLY"
    );
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_view_joins_in_relation_order() {
    let relations = vec![Relation::new("orders.customer_id", "customers.id")];
    let schema = Schema::builder("order_details", SchemaSource::view(relations))
        .column(Column::new("orders.amount", ColumnType::Float))
        .column(Column::new("customers.name", ColumnType::String))
        .order_by(["orders.amount DESC"])
        .build()
        .unwrap();

    let compiled = build_query(&schema, &options()).unwrap();
    assert_eq!(compiled.dialect, Dialect::DuckDb);
    assert!(compiled.sql.starts_with(
        "SELECT \"orders\".\"amount\" AS \"orders_amount\", \
         \"customers\".\"name\" AS \"customers_name\" FROM \"orders\""
    ));
    assert!(compiled
        .sql
        .contains(" JOIN \"customers\" ON \"orders\".\"customer_id\" = \"customers\".\"id\""));
    assert!(compiled.sql.ends_with("ORDER BY \"orders\".\"amount\" DESC"));
}

// ============================================================================
// Expression columns
// ============================================================================

fn city_balances() -> Schema {
    Schema::builder(
        "city_balances",
        SchemaSource::relational(Engine::Postgres, Connection::new("db", "crm"), "customers"),
    )
    .column(Column::new("city", ColumnType::String))
    .column(
        Column::new("balance", ColumnType::Float)
            .with_expression("sum(balance)")
            .with_alias("total"),
    )
    .group_by(["city"])
    .build()
    .unwrap()
}

#[test]
fn test_expression_identifiers_fold_with_columns() {
    for dialect in [Dialect::Snowflake, Dialect::Oracle] {
        let compiled = build_query(&city_balances(), &options().with_dialect(dialect)).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT \"CITY\", sum(\"BALANCE\") AS \"total\" FROM \"CUSTOMERS\" GROUP BY \"CITY\"",
            "{dialect}"
        );
    }
}

#[test]
fn test_user_alias_keeps_its_case() {
    let schema = Schema::builder(
        "orders",
        SchemaSource::relational(Engine::Postgres, Connection::new("db", "shop"), "orders"),
    )
    .column(Column::new("amount", ColumnType::Float).with_alias("orderAmount"))
    .build()
    .unwrap();
    let compiled = build_query(&schema, &options().with_dialect(Dialect::Snowflake)).unwrap();
    assert_eq!(compiled.sql, "SELECT \"AMOUNT\" AS \"orderAmount\" FROM \"ORDERS\"");
}

#[test]
#[cfg(unix)]
fn test_comment_in_expression_keeps_alias() {
    let schema = Schema::builder("sales", SchemaSource::file(FileFormat::Csv, "sales/sales.csv"))
        .column(
            Column::new("amount", ColumnType::Float)
                .with_expression("sum(amount) -- gross, before refunds")
                .with_alias("total"),
        )
        .group_by(["region"])
        .build()
        .unwrap();

    let compiled = build_query(&schema, &options()).unwrap();
    insta::assert_snapshot!(
        compiled.sql,
        @r#"SELECT sum("amount") AS "total" FROM read_csv('/data/sales/sales.csv') GROUP BY "region""#
    );
    let head = build_head_query(&schema, &options(), Some(2)).unwrap();
    assert!(head.sql.contains("AS \"total\""), "{}", head.sql);
}
