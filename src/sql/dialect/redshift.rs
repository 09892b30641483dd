//! Amazon Redshift dialect.
//!
//! Redshift is based on PostgreSQL 8.0 and shares its quoting, literals and
//! function names.

use sqlparser::dialect::{Dialect as ParserDialect, RedshiftSqlDialect};

use super::helpers;
use super::SqlDialect;

/// Amazon Redshift dialect.
#[derive(Debug, Clone, Copy)]
pub struct Redshift;

impl SqlDialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn identifier_quote(&self) -> char {
        '"'
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_redshift(name)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(RedshiftSqlDialect {})
    }
}
