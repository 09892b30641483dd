//! Databricks (Spark SQL) dialect.
//!
//! Databricks features:
//! - Backtick identifier quoting
//! - Unity Catalog three-level names (`catalog.schema.table`)

use sqlparser::dialect::{Dialect as ParserDialect, GenericDialect};

use super::helpers;
use super::SqlDialect;
use crate::model::types::ColumnType;

/// Databricks (Spark SQL) dialect.
#[derive(Debug, Clone, Copy)]
pub struct Databricks;

impl SqlDialect for Databricks {
    fn name(&self) -> &'static str {
        "databricks"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_databricks(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_databricks(ty)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        // Spark SQL reads fine with the generic grammar (it accepts backticks).
        Box::new(GenericDialect {})
    }
}
