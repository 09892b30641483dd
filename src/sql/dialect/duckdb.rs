//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible with extensions:
//! - ANSI identifier quoting (`"`)
//! - Direct file scans via `read_csv`, `read_parquet` and `read_excel`
//! - `?` placeholders in its Python driver

use sqlparser::dialect::{Dialect as ParserDialect, DuckDbDialect};

use super::helpers;
use super::{PlaceholderStyle, SqlDialect};

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
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

    // Uses default emit_limit_offset (LIMIT ... OFFSET ...)

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_duckdb(name)
    }

    fn supports_file_scan(&self) -> bool {
        true
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }

    fn parser_dialect(&self) -> Box<dyn ParserDialect> {
        Box::new(DuckDbDialect {})
    }
}
