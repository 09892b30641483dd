//! PostgreSQL dialect.

use sqlparser::dialect::{Dialect as ParserDialect, PostgreSqlDialect};

use super::helpers;
use super::SqlDialect;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
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
        helpers::remap_function_postgres(name)
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(PostgreSqlDialect {})
    }
}
