//! Snowflake SQL dialect.
//!
//! Snowflake stores unquoted identifiers upper-cased, so generated names are
//! folded to upper case before quoting.

use sqlparser::dialect::{Dialect as ParserDialect, SnowflakeDialect};

use super::helpers;
use super::SqlDialect;
use crate::model::types::ColumnType;

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn normalize_identifier(&self, ident: &str) -> String {
        helpers::fold_upper(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_snowflake(name)
    }

    fn emit_data_type(&self, ty: ColumnType) -> &'static str {
        helpers::emit_data_type_snowflake(ty)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(SnowflakeDialect {})
    }
}
