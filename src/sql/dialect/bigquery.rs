//! BigQuery SQL dialect.
//!
//! BigQuery features:
//! - Backtick identifier quoting
//! - Project-qualified table names (`project.dataset.table`)

use sqlparser::dialect::{BigQueryDialect, Dialect as ParserDialect};

use super::helpers;
use super::SqlDialect;
use crate::model::types::ColumnType;

/// BigQuery SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct BigQuery;

impl SqlDialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
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
        helpers::remap_function_bigquery(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_bigquery(ty)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(BigQueryDialect {})
    }
}
