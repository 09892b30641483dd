//! Integration tests for JSON and TOML schema documents.

use quarry::model::{
    ColumnType, Engine, FileFormat, Schema, SchemaDocument, SchemaError, SchemaSource,
    TransformationKind,
};

#[test]
fn test_toml_document() {
    let text = r#"
name = "sales"
description = "Daily sales by region"
group_by = ["region"]

[source]
type = "csv"
path = "sales/sales.csv"

[[columns]]
name = "amount"
type = "float"
expression = "sum(amount)"
alias = "total"

[[transformations]]
type = "round_numbers"
params = { column = "amount", decimals = 2 }
"#;

    let schema = Schema::from_toml(text).unwrap();
    assert_eq!(schema.name(), "sales");
    assert_eq!(schema.description(), Some("Daily sales by region"));
    assert_eq!(schema.group_by(), ["region".to_string()]);
    assert_eq!(schema.columns()[0].alias.as_deref(), Some("total"));
    assert_eq!(
        schema.transformations()[0].kind(),
        TransformationKind::RoundNumbers
    );
    assert!(matches!(
        schema.source(),
        SchemaSource::File {
            format: FileFormat::Csv,
            ..
        }
    ));
}

#[test]
fn test_json_relational_document() {
    let schema = Schema::from_json(
        r#"{
            "name": "orders",
            "source": {
                "type": "mssql",
                "table": "dbo.orders",
                "connection": {"host": "sql01", "database": "shop", "port": 14330}
            },
            "columns": [
                {"name": "id", "type": "integer"},
                {"name": "placed_at", "type": "datetime"}
            ]
        }"#,
    )
    .unwrap();

    match schema.source() {
        SchemaSource::Relational {
            engine,
            connection,
            table,
        } => {
            assert_eq!(*engine, Engine::SqlServer);
            assert_eq!(connection.port_for(*engine), 14330);
            assert_eq!(table, "dbo.orders");
        }
        other => panic!("unexpected source: {other:?}"),
    }
    assert_eq!(schema.columns()[1].ty, ColumnType::Datetime);
}

#[test]
fn test_json_view_document() {
    let schema = Schema::from_json(
        r#"{
            "name": "order_details",
            "view": true,
            "relations": [
                {"name": "buyer", "from": "orders.customer_id", "to": "customers.id"}
            ],
            "columns": [
                {"name": "orders.amount", "type": "float"},
                {"name": "customers.name", "type": "string"}
            ]
        }"#,
    )
    .unwrap();
    assert!(schema.source().is_view());
    assert_eq!(schema.view_plan().unwrap().base, "orders");
}

#[test]
fn test_unknown_column_type() {
    let err = Schema::from_json(
        r#"{"name": "s", "source": {"type": "csv", "path": "x.csv"},
            "columns": [{"name": "a", "type": "decimal"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));
}

#[test]
fn test_unknown_transformation_in_document() {
    let err = Schema::from_json(
        r#"{"name": "s", "source": {"type": "csv", "path": "x.csv"},
            "transformations": [{"type": "pivot", "params": {"column": "a"}}]}"#,
    )
    .unwrap_err();
    assert_eq!(err, SchemaError::UnsupportedTransformation("pivot".into()));
}

#[test]
fn test_relations_require_view() {
    let err = Schema::from_json(
        r#"{"name": "s", "source": {"type": "csv", "path": "x.csv"},
            "relations": [{"from": "a.id", "to": "b.id"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema { .. }));
}

#[test]
fn test_toml_round_trip() {
    let text = r#"
name = "events"
limit = 50
order_by = ["ts DESC"]

[source]
type = "parquet"
path = "events/*.parquet"

[[columns]]
name = "ts"
type = "datetime"

[[transformations]]
type = "format_date"
params = { column = "ts", format = "%Y-%m-%d" }
"#;
    let schema = Schema::from_toml(text).unwrap();
    let saved = schema.to_document().to_toml().unwrap();
    let reloaded = SchemaDocument::from_toml(&saved).unwrap().into_schema().unwrap();
    assert_eq!(reloaded, schema);
}
