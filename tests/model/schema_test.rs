//! Integration tests for schema construction and validation.

use quarry::model::{
    Column, ColumnType, Connection, Engine, FileFormat, Relation, Schema, SchemaError,
    SchemaSource, Transformation, TransformationKind,
};
use serde_json::json;

fn parquet() -> SchemaSource {
    SchemaSource::file(FileFormat::Parquet, "orders.parquet")
}

// ============================================================================
// Transformations
// ============================================================================

#[test]
fn test_unknown_transformation_kind_is_rejected() {
    let err = Transformation::new("explode", json!({"column": "x"})).unwrap_err();
    assert_eq!(err, SchemaError::UnsupportedTransformation("explode".into()));
}

#[test]
fn test_every_kind_round_trips_its_name() {
    for kind in TransformationKind::ALL {
        assert_eq!(kind.as_str().parse::<TransformationKind>().unwrap(), kind);
    }
}

#[test]
fn test_missing_column_param() {
    let err = Transformation::new("strip", json!({})).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::InvalidTransformationParams { ref param, .. } if param == "column"
    ));
}

#[test]
fn test_remove_duplicates_needs_no_column() {
    let t = Transformation::new("remove_duplicates", json!(null)).unwrap();
    assert_eq!(t.kind(), TransformationKind::RemoveDuplicates);
    assert_eq!(t.column(), None);
}

#[test]
fn test_clip_bounds_are_checked() {
    assert!(Transformation::new("clip", json!({"column": "x"})).is_err());
    assert!(Transformation::new("clip", json!({"column": "x", "lower": 5, "upper": 1})).is_err());
    assert!(Transformation::new("clip", json!({"column": "x", "upper": 1})).is_ok());
}

#[test]
fn test_bin_labels_must_match_buckets() {
    let ok = json!({"column": "age", "bins": [0, 18, 65], "labels": ["minor", "adult"]});
    assert!(Transformation::new("bin", ok).is_ok());

    let short = json!({"column": "age", "bins": [0, 18, 65], "labels": ["minor"]});
    assert!(Transformation::new("bin", short).is_err());

    let unsorted = json!({"column": "age", "bins": [18, 0]});
    assert!(Transformation::new("bin", unsorted).is_err());
}

#[test]
fn test_params_must_be_an_object() {
    assert!(Transformation::new("strip", json!(["column", "x"])).is_err());
}

// ============================================================================
// Schemas
// ============================================================================

#[test]
fn test_name_is_sanitized() {
    let schema = Schema::builder("Monthly Sales-2024", parquet()).build().unwrap();
    assert_eq!(schema.name(), "monthly_sales_2024");
}

#[test]
fn test_transformation_on_undeclared_column_without_columns() {
    // With no declared columns the projection is `*`, so any target goes.
    let schema = Schema::builder("orders", parquet())
        .transformation(Transformation::new("strip", json!({"column": "status"})).unwrap())
        .build();
    assert!(schema.is_ok());
}

#[test]
fn test_remove_duplicates_columns_must_exist() {
    let err = Schema::builder("orders", parquet())
        .column(Column::new("id", ColumnType::Integer))
        .transformation(
            Transformation::new("remove_duplicates", json!({"columns": ["id", "sku"]})).unwrap(),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownColumn { ref column, .. } if column == "sku"));
}

#[test]
fn test_column_lookup_is_case_insensitive() {
    let schema = Schema::builder("orders", parquet())
        .column(Column::new("OrderId", ColumnType::Integer))
        .build()
        .unwrap();
    assert!(schema.column("orderid").is_some());
    assert!(schema.column("missing").is_none());
}

#[test]
fn test_relational_source_needs_table() {
    let source = SchemaSource::relational(Engine::Postgres, Connection::new("db", "shop"), "");
    let err = Schema::builder("orders", source).build().unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema { .. }));
}

#[test]
fn test_view_join_chain_follows_relation_order() {
    let relations = vec![
        Relation::new("orders.customer_id", "customers.id"),
        Relation::new("regions.id", "customers.region_id"),
    ];
    let schema = Schema::builder("order_view", SchemaSource::view(relations))
        .column(Column::new("orders.amount", ColumnType::Float))
        .column(Column::new("regions.name", ColumnType::String))
        .build()
        .unwrap();

    let plan = schema.view_plan().unwrap();
    assert_eq!(plan.base, "orders");
    let joined: Vec<&str> = plan.joins.iter().map(|j| j.table.as_str()).collect();
    assert_eq!(joined, ["customers", "regions"]);
}

#[test]
fn test_view_relations_must_be_connected() {
    let relations = vec![
        Relation::new("orders.customer_id", "customers.id"),
        Relation::new("products.id", "suppliers.product_id"),
    ];
    let err = Schema::builder("v", SchemaSource::view(relations))
        .build()
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema { .. }));
}

#[test]
fn test_view_without_relations_reads_one_table() {
    let schema = Schema::builder("v", SchemaSource::view(vec![]))
        .column(Column::new("orders.id", ColumnType::Integer))
        .column(Column::new("orders.amount", ColumnType::Float))
        .build()
        .unwrap();
    assert_eq!(schema.view_plan().unwrap().base, "orders");
    assert!(schema.view_plan().unwrap().joins.is_empty());
}
